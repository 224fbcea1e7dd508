/// Byte-oriented serial link abstraction
///
/// The protocol engine only needs blocking writes and bounded reads, so it
/// talks to this trait instead of a concrete port. Production uses
/// [`SerialLink`] over the `serialport` crate; tests substitute a scripted
/// in-memory link.
use std::io;
use std::time::Duration;

use log::info;
use serialport::SerialPort;

pub trait Link {
    /// Write the whole buffer, blocking up to the link timeout.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read up to `count` bytes, blocking up to the link timeout.
    /// Returns fewer bytes (possibly none) if the timeout expires first.
    fn read(&mut self, count: usize) -> io::Result<Vec<u8>>;
}

/// Serial port link to the console. Closing is dropping.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open the given tty with 8N1 framing and a blocking read timeout.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud).timeout(timeout).open()?;
        info!("Serial port {} open at {} baud", path, baud);
        Ok(SerialLink { port })
    }
}

impl Link for SerialLink {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)
    }

    fn read(&mut self, count: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        let mut filled = 0;
        while filled < count {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}
