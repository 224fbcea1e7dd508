use std::fmt;

/// Storm start date as packed by the console: 7 bits of year offset from
/// 2000, 5 bits of day, 4 bits of month. The console uses out-of-range
/// encodings (month 0, day 0, 0xFFFF) when no storm is active, so this stays
/// a plain triple rather than a validated calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StormDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl StormDate {
    /// Unpack a 16-bit storm date field.
    pub fn from_packed(value: u16) -> Self {
        StormDate {
            year: (value & 0x7f) + 2000,
            day: ((value >> 7) & 0x1f) as u8,
            month: ((value >> 12) & 0x0f) as u8,
        }
    }
}

impl fmt::Display for StormDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One fully decoded, unit-normalized LOOP record.
///
/// Optional fields are `None` when the console sent the sentinel value for
/// "sensor not present" (0xFF for byte fields, 0x7FFF for solar radiation).
/// Fields past the battery section are diagnostic: decoded for completeness
/// but never emitted as events.
#[derive(Debug, Clone)]
pub struct LoopRecord {
    /// Barometric trend code as sent by the console
    pub bar_trend: u8,
    /// LOOP packet type (0 for this record layout)
    pub packet_type: u8,
    /// Archive pointer of the next record slot
    pub next_record: u16,
    /// Barometric pressure in hPa, calibration offset applied
    pub pressure: f64,
    /// Indoor temperature in °C
    pub temp_in: f64,
    /// Indoor humidity in %
    pub hum_in: u8,
    /// Outdoor temperature in °C
    pub temp_out: f64,
    /// Current wind speed in m/s
    pub wind_speed: f64,
    /// 10-minute average wind speed in m/s (decoded but not emitted; the
    /// console reports wind every ~2 s and downstream computes its own means)
    pub wind_speed_10min: f64,
    /// Wind direction in degrees (1-360, 0 = no data)
    pub wind_dir: u16,
    /// Extra temperature sensors 1-7 in °C
    pub extra_temp: [Option<f64>; 7],
    /// Outdoor humidity in %
    pub hum_out: u8,
    /// Extra humidity sensors 1-7 in %
    pub extra_hum: [Option<u8>; 7],
    /// Rain rate in mm/h
    pub rain_rate: f64,
    /// UV index (raw console units)
    pub uv: Option<u8>,
    /// Solar radiation in W/m²
    pub solar_rad: Option<u16>,
    /// Rain total of the current storm in mm
    pub rain_storm: f64,
    /// Start date of the current storm
    pub storm_start: StormDate,
    /// Rain totals in mm
    pub rain_day: f64,
    pub rain_month: f64,
    pub rain_year: f64,
    /// Evapotranspiration totals, raw console units
    pub et_day: u16,
    pub et_month: u16,
    pub et_year: u16,
    /// Soil temperature / moisture and leaf temperature / wetness probes,
    /// raw pass-through
    pub soil_temps: [u8; 4],
    pub leaf_temps: [u8; 4],
    pub soil_moist: [u8; 4],
    pub leaf_wetness: [u8; 4],
    /// Alarm bitfields, raw pass-through
    pub alarm_inside: u8,
    pub alarm_rain: u8,
    pub alarm_outside: [u8; 2],
    pub alarm_extra: [u8; 8],
    pub alarm_soil_leaf: [u8; 4],
    /// Transmitter battery status bitfield
    pub battery_status: u8,
    /// Console battery voltage in volts
    pub battery_volts: f64,
    /// Forecast icon and rule number shown on the console
    pub forecast_icon: u8,
    pub forecast_rule: u8,
    /// Sunrise / sunset as packed HHMM values
    pub sunrise: u16,
    pub sunset: u16,
}

/// One wind observation: speed in m/s, direction in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSample {
    pub speed: f64,
    pub dir: u16,
}

/// Semantic weather events emitted to the sink, one burst per decoded record.
///
/// Sensor ids: 0 = indoor, 1 = outdoor primary, 2-8 = extra sensor stations.
/// A single LOOP record carries no separate gust observation, so `mean` and
/// `gust` are reported identically; downstream aggregation distinguishes them.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherEvent {
    Pressure { hpa: f64 },
    Temperature { sensor: u8, celsius: f64 },
    Humidity { sensor: u8, percent: u8 },
    Rain { rate: f64, total: f64 },
    Wind { mean: WindSample, gust: WindSample },
    Uv { index: u8 },
    Radiation { watts_per_m2: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storm_date_unpack() {
        // year = (0x0105 & 0x7f) + 2000 = 2005
        // day = (0x0105 >> 7) & 0x1f = 2
        // month = (0x0105 >> 12) & 0x0f = 0
        let date = StormDate::from_packed(0x0105);
        assert_eq!(date.year, 2005);
        assert_eq!(date.day, 2);
        assert_eq!(date.month, 0);
    }

    #[test]
    fn test_storm_date_all_fields() {
        // month 6, day 21, year offset 24 -> 2024-06-21
        let packed: u16 = (6 << 12) | (21 << 7) | 24;
        let date = StormDate::from_packed(packed);
        assert_eq!(date.year, 2024);
        assert_eq!(date.month, 6);
        assert_eq!(date.day, 21);
        assert_eq!(date.to_string(), "2024-06-21");
    }

    #[test]
    fn test_storm_date_cleared() {
        // The console reports 0xFFFF when no storm is active
        let date = StormDate::from_packed(0xffff);
        assert_eq!(date.year, 2127);
        assert_eq!(date.month, 15);
        assert_eq!(date.day, 31);
    }
}
