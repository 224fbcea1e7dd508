pub mod crc;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod link;
pub mod session;

pub use driver::Driver;
pub use error::StationError;
