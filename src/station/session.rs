/// Console session: wakeup handshake and command/acknowledgment exchange
use std::fmt::Display;

use log::debug;

use crate::station::decoder::LOOP_FRAME_SIZE;
use crate::station::error::StationError;
use crate::station::link::Link;

// Device reply sequences
pub const WAKE_ACK: &[u8] = b"\n\r";
pub const ACK: &[u8] = &[0x06];
pub const OK: &[u8] = b"\n\rOK\n\r";
/// Escape byte reserved by the protocol; the streaming path never sees it.
#[allow(dead_code)]
pub const ESC: u8 = 0x1b;

/// Wakeup and command exchanges are each tried this many times before the
/// session gives up and hands the error to the polling loop.
const ATTEMPTS: usize = 3;

/// An open session with the console. Owns the link for its whole lifetime;
/// dropping the session closes the link.
pub struct Session<L: Link> {
    link: L,
}

impl<L: Link> Session<L> {
    pub fn new(link: L) -> Self {
        Session { link }
    }

    /// Take the console out of standby mode.
    ///
    /// Writes a single line feed and expects the two-byte wake
    /// acknowledgment back, up to [`ATTEMPTS`] times.
    pub fn wakeup(&mut self) -> Result<(), StationError> {
        debug!("send: WAKEUP");
        for _ in 0..ATTEMPTS {
            self.link.write_all(b"\n")?;
            let ack = self.link.read(WAKE_ACK.len())?;
            debug!("read: {}", to_hex(&ack));
            if ack == WAKE_ACK {
                return Ok(());
            }
        }
        Err(StationError::Connection)
    }

    /// Send a command with space-joined arguments and wait for the console
    /// to acknowledge it.
    ///
    /// Most commands answer with the single ACK byte; commands issued with
    /// `expect_ok` answer with the full `OK` line instead.
    pub fn command<A: Display>(
        &mut self,
        name: &str,
        args: &[A],
        expect_ok: bool,
    ) -> Result<(), StationError> {
        let mut line = name.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.to_string());
        }
        debug!("send: {}", line);

        let wire = format!("{}\n", line);
        let expected: &[u8] = if expect_ok { OK } else { ACK };
        for _ in 0..ATTEMPTS {
            self.link.write_all(wire.as_bytes())?;
            let reply = self.link.read(expected.len())?;
            debug!("read: {}", to_hex(&reply));
            if reply == expected {
                return Ok(());
            }
        }
        Err(StationError::Command(line))
    }

    /// Read one streaming frame off the link. Short on timeout; the caller
    /// decides what an undersized buffer means.
    pub fn read_frame(&mut self) -> Result<Vec<u8>, StationError> {
        let raw = self.link.read(LOOP_FRAME_SIZE)?;
        debug!("read: {}", to_hex(&raw));
        Ok(raw)
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Link stub fed with canned replies: each `read` call pops the next
    /// scripted reply; an exhausted script behaves like a read timeout.
    struct MockLink {
        replies: VecDeque<Vec<u8>>,
        writes: Vec<Vec<u8>>,
    }

    impl MockLink {
        fn new(replies: &[&[u8]]) -> Self {
            MockLink {
                replies: replies.iter().map(|r| r.to_vec()).collect(),
                writes: Vec::new(),
            }
        }
    }

    impl Link for MockLink {
        fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn read(&mut self, count: usize) -> io::Result<Vec<u8>> {
            let mut reply = self.replies.pop_front().unwrap_or_default();
            reply.truncate(count);
            Ok(reply)
        }
    }

    #[test]
    fn test_wakeup_first_try() {
        let mut session = Session::new(MockLink::new(&[WAKE_ACK]));
        assert!(session.wakeup().is_ok());
        assert_eq!(session.link.writes, vec![b"\n".to_vec()]);
    }

    #[test]
    fn test_wakeup_succeeds_on_last_attempt() {
        let mut session = Session::new(MockLink::new(&[b"", b"", WAKE_ACK]));
        assert!(session.wakeup().is_ok());
        assert_eq!(session.link.writes.len(), 3);
    }

    #[test]
    fn test_wakeup_gives_up_after_three_attempts() {
        let mut session = Session::new(MockLink::new(&[]));
        let result = session.wakeup();
        assert!(matches!(result, Err(StationError::Connection)));
        // Exactly three wakeup writes, no more
        assert_eq!(session.link.writes, vec![b"\n".to_vec(); 3]);
    }

    #[test]
    fn test_command_formats_args_and_newline() {
        let mut session = Session::new(MockLink::new(&[ACK]));
        session.command("LOOP", &[25u32], false).unwrap();
        assert_eq!(session.link.writes, vec![b"LOOP 25\n".to_vec()]);
    }

    #[test]
    fn test_command_expect_ok_reads_ok_line() {
        let mut session = Session::new(MockLink::new(&[OK]));
        assert!(session.command("TEST", &[] as &[u32], true).is_ok());
        assert_eq!(session.link.writes, vec![b"TEST\n".to_vec()]);
    }

    #[test]
    fn test_command_gives_up_after_three_attempts() {
        // Wrong reply every time
        let mut session = Session::new(MockLink::new(&[b"\x15", b"\x15", b"\x15"]));
        let result = session.command("LOOP", &[25u32], false);
        match result {
            Err(StationError::Command(cmd)) => assert_eq!(cmd, "LOOP 25"),
            other => panic!("expected Command error, got {:?}", other),
        }
        assert_eq!(session.link.writes.len(), 3);
    }

    #[test]
    fn test_read_frame_passes_short_reads_through() {
        let mut session = Session::new(MockLink::new(&[b"LOO"]));
        let raw = session.read_frame().unwrap();
        assert_eq!(raw, b"LOO");
    }
}
