/// Polling loop: the reconnect/retry state machine around one station session
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::config::StationConfig;
use crate::models::{LoopRecord, WeatherEvent, WindSample};
use crate::output::EventSink;
use crate::station::crc;
use crate::station::decoder::{Decoder, RawFrame};
use crate::station::error::StationError;
use crate::station::link::Link;
use crate::station::session::Session;

/// Pause between two streaming batches within the same session.
const INTER_BATCH_DELAY: Duration = Duration::from_secs(2);
/// How often sleeps re-check the cancellation flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// A single bad frame is tolerated; the second consecutive one aborts.
const MAX_CONSECUTIVE_BAD_CRC: u32 = 1;

/// Acquisition driver for one console.
///
/// Opens a link through `opener`, runs the handshake and the `LOOP` streaming
/// cycle, and emits one burst of [`WeatherEvent`]s per valid frame into
/// `sink`. Every failure tears the session down, backs off proportionally to
/// the batch size and reconnects; only the cancellation flag stops the loop.
pub struct Driver<O, S> {
    config: StationConfig,
    opener: O,
    sink: S,
    cancel: Arc<AtomicBool>,
}

impl<L, O, S> Driver<O, S>
where
    L: Link,
    O: FnMut(&StationConfig) -> Result<L, StationError>,
    S: EventSink,
{
    pub fn new(config: StationConfig, opener: O, sink: S, cancel: Arc<AtomicBool>) -> Self {
        Driver {
            config,
            opener,
            sink,
            cancel,
        }
    }

    /// Run until the cancellation flag is set. Never returns on its own.
    pub fn run(&mut self) {
        info!(
            "Starting VantagePro acquisition on {} at {} baud",
            self.config.port, self.config.baud
        );

        while !self.cancelled() {
            let result = match (self.opener)(&self.config) {
                Ok(link) => self.run_session(Session::new(link)),
                Err(e) => Err(e),
            };

            // The session link is dropped (closed) at this point. Any error
            // is recoverable: log it, back off, reconnect.
            if let Err(e) = result {
                error!("{}", e);
                self.sleep_cancellable(Duration::from_secs(u64::from(self.config.loops) * 2));
            }
        }

        info!("Acquisition stopped");
    }

    /// Drive one session: wakeup, then streaming batches until cancellation
    /// or an error. Consumes the session so the link closes on return.
    fn run_session(&mut self, mut session: Session<L>) -> Result<(), StationError> {
        session.wakeup()?;
        loop {
            session.command("LOOP", &[self.config.loops], false)?;
            self.stream_batch(&mut session)?;
            if self.cancelled() {
                return Ok(());
            }
            // Re-issue LOOP within the same session, no reconnect needed
            self.sleep_cancellable(INTER_BATCH_DELAY);
            if self.cancelled() {
                return Ok(());
            }
        }
    }

    /// Read the configured number of frames off an active LOOP command.
    fn stream_batch(&mut self, session: &mut Session<L>) -> Result<(), StationError> {
        let decoder = Decoder::new(self.config.rain_bucket, self.config.pressure_cal);
        let mut bad_crc: u32 = 0;

        for _ in 0..self.config.loops {
            let raw = session.read_frame()?;
            // A short read falls through to the bad-frame branch: an
            // undersized buffer can never carry a zero CRC residue.
            match <&RawFrame>::try_from(raw.as_slice()) {
                Ok(frame) if crc::verify(frame) => {
                    bad_crc = 0;
                    debug!("CRC OK");
                    let record = decoder.decode(frame);
                    self.emit_record(&record);
                }
                _ => {
                    info!("CRC Bad");
                    bad_crc += 1;
                    // Two consecutive CRC errors abort the LOOP command
                    if bad_crc > MAX_CONSECUTIVE_BAD_CRC {
                        return Err(StationError::Protocol);
                    }
                }
            }
        }
        Ok(())
    }

    /// Map one decoded record to its ordered burst of events and log a
    /// one-line summary.
    fn emit_record(&mut self, record: &LoopRecord) {
        self.sink.send(WeatherEvent::Pressure {
            hpa: record.pressure,
        });
        let mut summary = format!("DATA PACKET Press:{:.1}mb ", record.pressure);

        // Inside temp & hum sensor
        self.sink.send(WeatherEvent::Temperature {
            sensor: 0,
            celsius: record.temp_in,
        });
        self.sink.send(WeatherEvent::Humidity {
            sensor: 0,
            percent: record.hum_in,
        });
        summary += &format!("TempIn:{:.1}C HumIn:{}% ", record.temp_in, record.hum_in);

        // Outside main temp & hum sensor
        self.sink.send(WeatherEvent::Temperature {
            sensor: 1,
            celsius: record.temp_out,
        });
        self.sink.send(WeatherEvent::Humidity {
            sensor: 1,
            percent: record.hum_out,
        });
        summary += &format!("TempOut:{:.1}C HumOut:{}% ", record.temp_out, record.hum_out);

        // Rain bucket
        self.sink.send(WeatherEvent::Rain {
            rate: record.rain_rate,
            total: record.rain_year,
        });
        summary += &format!("Rain:{:.2}mm {:.2}mm/h ", record.rain_year, record.rain_rate);

        // Wind sensor. A LOOP record carries a single observation, so mean
        // and gust are reported identically; the console sends wind every
        // ~2 s and downstream computes its own means.
        let wind = WindSample {
            speed: record.wind_speed,
            dir: record.wind_dir,
        };
        self.sink.send(WeatherEvent::Wind {
            mean: wind,
            gust: wind,
        });
        summary += &format!("Wind:{:.3}m/s {} ", record.wind_speed, record.wind_dir);

        // Extra temp & hum sensor stations
        for i in 0..7 {
            if let Some(celsius) = record.extra_temp[i] {
                self.sink.send(WeatherEvent::Temperature {
                    sensor: (i + 2) as u8,
                    celsius,
                });
                summary += &format!("Temp{}:{:.1}C ", i + 1, celsius);
            }
            if let Some(percent) = record.extra_hum[i] {
                self.sink.send(WeatherEvent::Humidity {
                    sensor: (i + 2) as u8,
                    percent,
                });
                summary += &format!("Hum{}:{}% ", i + 1, percent);
            }
        }

        // UV sensor
        if let Some(index) = record.uv {
            self.sink.send(WeatherEvent::Uv { index });
            summary += &format!("UV:{} ", index);
        }

        // Solar radiation sensor
        if let Some(watts_per_m2) = record.solar_rad {
            self.sink.send(WeatherEvent::Radiation { watts_per_m2 });
            summary += &format!("Rad:{}W/m2 ", watts_per_m2);
        }

        info!("{}", summary.trim_end());
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Sleep for `total`, waking early if cancellation is requested.
    fn sleep_cancellable(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while !self.cancelled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(CANCEL_POLL_INTERVAL));
        }
    }
}
