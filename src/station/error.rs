use thiserror::Error;

/// Errors raised by the station protocol engine.
///
/// Every variant is recoverable at the polling-loop level: the loop logs it,
/// tears the link down, backs off and reconnects. None of them terminates
/// the process.
#[derive(Debug, Error)]
pub enum StationError {
    /// The console never acknowledged the wakeup sequence.
    #[error("cannot access weather station (WAKEUP)")]
    Connection,

    /// A command was never acknowledged; carries the command line sent.
    #[error("cannot access weather station ({0})")]
    Command(String),

    /// Two consecutive frames failed the CRC check.
    #[error("CRC error")]
    Protocol,

    /// Serial port open/configuration failure.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Link read/write failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
