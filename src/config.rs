use std::env;
use std::time::Duration;

/// Serial port speeds supported by the VantagePro console.
const SUPPORTED_BAUD_RATES: [u32; 5] = [1200, 2400, 4800, 9600, 19200];

/// Rain collector type installed on the station.
///
/// The console reports rain as bucket-tip counts; what one tip means depends
/// on the installed collector, so the mode is fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainBucket {
    /// European collector, 0.2 mm per bucket tip
    Eu,
    /// US collector, 0.01 in per bucket tip
    Us,
}

#[derive(Debug, Clone)]
pub struct StationConfig {
    /// Serial port tty the console is attached to
    pub port: String,
    /// Serial port speed
    pub baud: u32,
    /// Number of LOOP frames requested per streaming command
    pub loops: u16,
    /// Installed rain collector type
    pub rain_bucket: RainBucket,
    /// Pressure calibration offset in mb
    pub pressure_cal: f64,
    /// Blocking read/write timeout on the serial link
    pub timeout: Duration,
}

impl StationConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let port = env::var("STATION_PORT").unwrap_or_else(|_| "/dev/ttyS0".to_string());

        let baud: u32 = match env::var("STATION_BAUD") {
            Ok(value) => value
                .parse()
                .map_err(|_| format!("STATION_BAUD is not a number: '{}'", value))?,
            Err(_) => 19200,
        };
        if !SUPPORTED_BAUD_RATES.contains(&baud) {
            return Err(format!(
                "Unsupported baud rate {}. Supported: {:?}",
                baud, SUPPORTED_BAUD_RATES
            )
            .into());
        }

        let loops: u16 = match env::var("STATION_LOOPS") {
            Ok(value) => value
                .parse()
                .map_err(|_| format!("STATION_LOOPS is not a number: '{}'", value))?,
            Err(_) => 25,
        };
        if loops == 0 {
            return Err("STATION_LOOPS must be at least 1".into());
        }

        let rain_bucket = match env::var("STATION_RAIN_BUCKET") {
            Ok(value) => match value.as_str() {
                "eu" => RainBucket::Eu,
                "us" => RainBucket::Us,
                other => {
                    return Err(format!(
                        "Unknown rain bucket type '{}'. Supported: eu, us",
                        other
                    )
                    .into())
                }
            },
            Err(_) => RainBucket::Eu,
        };

        let pressure_cal: f64 = match env::var("STATION_PRESSURE_CAL") {
            Ok(value) => value
                .parse()
                .map_err(|_| format!("STATION_PRESSURE_CAL is not a number: '{}'", value))?,
            Err(_) => 0.0,
        };

        Ok(StationConfig {
            port,
            baud,
            loops,
            rain_bucket,
            pressure_cal,
            timeout: Duration::from_secs(10),
        })
    }
}
