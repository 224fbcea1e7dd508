/// Event output boundary
///
/// The driver pushes decoded weather events through this trait; what happens
/// to them afterwards is not its concern. The default sink just logs them,
/// which keeps the binary useful on its own and makes a downstream consumer
/// a drop-in replacement.
use log::info;

use crate::models::WeatherEvent;

pub trait EventSink {
    fn send(&mut self, event: WeatherEvent);
}

/// Sink that writes each event as one structured log line.
pub struct LogSink;

impl EventSink for LogSink {
    fn send(&mut self, event: WeatherEvent) {
        match event {
            WeatherEvent::Pressure { hpa } => info!("event press {:.2} hPa", hpa),
            WeatherEvent::Temperature { sensor, celsius } => {
                info!("event temp[{}] {:.1} C", sensor, celsius)
            }
            WeatherEvent::Humidity { sensor, percent } => {
                info!("event hum[{}] {} %", sensor, percent)
            }
            WeatherEvent::Rain { rate, total } => {
                info!("event rain {:.2} mm/h, {:.2} mm total", rate, total)
            }
            WeatherEvent::Wind { mean, gust } => info!(
                "event wind {:.1} m/s from {} deg (gust {:.1} m/s from {} deg)",
                mean.speed, mean.dir, gust.speed, gust.dir
            ),
            WeatherEvent::Uv { index } => info!("event uv {}", index),
            WeatherEvent::Radiation { watts_per_m2 } => {
                info!("event rad {} W/m2", watts_per_m2)
            }
        }
    }
}
