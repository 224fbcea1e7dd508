mod config;
mod models;
mod output;
mod station;
mod utils;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{error, info};

use config::StationConfig;
use output::LogSink;
use station::link::SerialLink;
use station::{Driver, StationError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match StationConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let mut driver = Driver::new(
        config,
        |config: &StationConfig| {
            SerialLink::open(&config.port, config.baud, config.timeout)
                .map_err(StationError::from)
        },
        LogSink,
        Arc::clone(&cancel),
    );

    // The serial protocol is blocking end to end, so the driver runs on a
    // dedicated thread while the async side only waits for Ctrl+C.
    let mut task = tokio::task::spawn_blocking(move || driver.run());

    tokio::select! {
        result = &mut task => {
            match result {
                Ok(()) => info!("Program completed successfully"),
                Err(e) => error!("Driver thread panicked: {}", e),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Program terminated by user. Exiting gracefully.");
            cancel.store(true, Ordering::Relaxed);
            // Let the driver finish its current frame and unwind
            let _ = task.await;
        }
    }

    Ok(())
}
