/// LOOP frame decoding and unit normalization
///
/// The console answers the `LOOP` command with fixed 99-byte packets, packed
/// little-endian with no padding:
/// - Bytes 0-2: "LOO" header marker
/// - Byte 3: barometric trend, byte 4: packet type, bytes 5-6: next record
/// - Bytes 7-8: pressure (thousandths of inHg)
/// - Bytes 9-10: inside temperature (tenths of °F), byte 11: inside humidity
/// - Bytes 12-13: outside temperature (tenths of °F)
/// - Byte 14: wind speed (mph), byte 15: 10-min average wind speed (mph)
/// - Bytes 16-17: wind direction (degrees)
/// - Bytes 18-24: extra temperatures 1-7 (tenths of °F, 0xFF = none)
/// - Bytes 25-28 / 29-32: soil / leaf temperatures (raw)
/// - Byte 33: outside humidity, bytes 34-40: extra humidities (0xFF = none)
/// - Bytes 41-42: rain rate (tips/h), byte 43: UV (0xFF = none)
/// - Bytes 44-45: solar radiation (W/m², 0x7FFF = none)
/// - Bytes 46-47: storm rain (tips), bytes 48-49: storm start date (packed)
/// - Bytes 50-55: day / month / year rain totals (tips)
/// - Bytes 56-61: day / month / year ET totals (raw)
/// - Bytes 62-65 / 66-69: soil moisture / leaf wetness (raw)
/// - Bytes 70-85: alarm bitfields (raw pass-through)
/// - Byte 86: battery status, bytes 87-88: battery voltage (raw ADC)
/// - Bytes 89-90: forecast icon / rule number
/// - Bytes 91-94: sunrise / sunset (packed HHMM)
/// - Bytes 95-96: "\n\r" terminator, bytes 97-98: CRC (big-endian)
use crate::config::RainBucket;
use crate::models::{LoopRecord, StormDate};
use crate::utils::{fahrenheit_to_celsius, inches_to_mm, inhg_to_hpa, mph_to_mps};

/// Exact size of one streaming record, trailing CRC included.
pub const LOOP_FRAME_SIZE: usize = 99;

/// One CRC-validated frame as read off the link. The fixed-size array type
/// makes undersized input unrepresentable, so decoding never fails.
pub type RawFrame = [u8; LOOP_FRAME_SIZE];

/// Stateless frame decoder, fixed to one rain-bucket mode and pressure
/// calibration for the lifetime of a session.
pub struct Decoder {
    rain_bucket: RainBucket,
    /// Pressure calibration offset in mb, added after conversion to hPa
    pressure_cal: f64,
}

impl Decoder {
    pub fn new(rain_bucket: RainBucket, pressure_cal: f64) -> Self {
        Decoder {
            rain_bucket,
            pressure_cal,
        }
    }

    /// Decode one frame into named, unit-normalized fields.
    pub fn decode(&self, raw: &RawFrame) -> LoopRecord {
        LoopRecord {
            bar_trend: raw[3],
            packet_type: raw[4],
            next_record: u16_at(raw, 5),
            pressure: inhg_to_hpa(u16_at(raw, 7) as f64 / 1000.0) + self.pressure_cal,
            temp_in: fahrenheit_to_celsius(u16_at(raw, 9) as f64 / 10.0),
            hum_in: raw[11],
            temp_out: fahrenheit_to_celsius(u16_at(raw, 12) as f64 / 10.0),
            wind_speed: mph_to_mps(raw[14] as f64),
            wind_speed_10min: mph_to_mps(raw[15] as f64),
            wind_dir: u16_at(raw, 16),
            extra_temp: std::array::from_fn(|i| {
                optional_byte(raw[18 + i]).map(|t| fahrenheit_to_celsius(t as f64 / 10.0))
            }),
            soil_temps: array_at(raw, 25),
            leaf_temps: array_at(raw, 29),
            hum_out: raw[33],
            extra_hum: std::array::from_fn(|i| optional_byte(raw[34 + i])),
            rain_rate: self.rain_mm(u16_at(raw, 41)),
            uv: optional_byte(raw[43]),
            solar_rad: optional_solar(u16_at(raw, 44)),
            rain_storm: self.rain_mm(u16_at(raw, 46)),
            storm_start: StormDate::from_packed(u16_at(raw, 48)),
            rain_day: self.rain_mm(u16_at(raw, 50)),
            rain_month: self.rain_mm(u16_at(raw, 52)),
            rain_year: self.rain_mm(u16_at(raw, 54)),
            et_day: u16_at(raw, 56),
            et_month: u16_at(raw, 58),
            et_year: u16_at(raw, 60),
            soil_moist: array_at(raw, 62),
            leaf_wetness: array_at(raw, 66),
            alarm_inside: raw[70],
            alarm_rain: raw[71],
            alarm_outside: array_at(raw, 72),
            alarm_extra: array_at(raw, 74),
            alarm_soil_leaf: array_at(raw, 82),
            battery_status: raw[86],
            battery_volts: u16_at(raw, 87) as f64 * 300.0 / 512.0 / 100.0,
            forecast_icon: raw[89],
            forecast_rule: raw[90],
            sunrise: u16_at(raw, 91),
            sunset: u16_at(raw, 93),
        }
    }

    /// Convert a bucket-tip count to millimeters for the configured
    /// collector: eu tips are 0.2 mm, us tips are 0.01 in.
    fn rain_mm(&self, tips: u16) -> f64 {
        match self.rain_bucket {
            RainBucket::Eu => tips as f64 / 5.0,
            RainBucket::Us => inches_to_mm(tips as f64 / 100.0),
        }
    }
}

fn u16_at(raw: &RawFrame, offset: usize) -> u16 {
    u16::from_le_bytes([raw[offset], raw[offset + 1]])
}

fn array_at<const N: usize>(raw: &RawFrame, offset: usize) -> [u8; N] {
    std::array::from_fn(|i| raw[offset + i])
}

/// Byte-sized sensor fields use 0xFF as the "not installed" sentinel; zero
/// is a legal physical value and stays a reading.
fn optional_byte(value: u8) -> Option<u8> {
    (value != 0xff).then_some(value)
}

/// The solar radiation field uses 0x7FFF as its sentinel.
fn optional_solar(value: u16) -> Option<u16> {
    (value != 0x7fff).then_some(value)
}

/// Frame fixtures shared by decoder and driver tests.
#[cfg(test)]
pub mod fixtures {
    use super::{LOOP_FRAME_SIZE, RawFrame};
    use crate::station::crc;

    /// A well-formed LOOP frame with every emitted sensor populated:
    /// pressure 29.920 inHg, inside 71.2 °F / 45 %, outside 68.5 °F / 80 %,
    /// wind 10 mph at 270°, extra sensor 1 at 16.0 °F / 60 %, rain rate 10
    /// tips, year total 250 tips, UV 6, solar 512 W/m², storm date 0x0105,
    /// battery ADC 512. Trailing CRC is computed, so the frame verifies.
    pub fn sample_frame() -> RawFrame {
        let mut raw = [0u8; LOOP_FRAME_SIZE];
        raw[0..3].copy_from_slice(b"LOO");
        raw[3] = 236; // bar trend: falling slowly
        raw[4] = 0; // packet type
        raw[5..7].copy_from_slice(&88u16.to_le_bytes()); // next record
        raw[7..9].copy_from_slice(&29920u16.to_le_bytes()); // pressure
        raw[9..11].copy_from_slice(&712u16.to_le_bytes()); // temp in
        raw[11] = 45; // hum in
        raw[12..14].copy_from_slice(&685u16.to_le_bytes()); // temp out
        raw[14] = 10; // wind speed
        raw[15] = 8; // wind speed 10-min
        raw[16..18].copy_from_slice(&270u16.to_le_bytes()); // wind dir
        raw[18..25].copy_from_slice(&[160, 255, 255, 255, 255, 255, 255]); // extra temps
        raw[33] = 80; // hum out
        raw[34..41].copy_from_slice(&[60, 255, 255, 255, 255, 255, 255]); // extra hums
        raw[41..43].copy_from_slice(&10u16.to_le_bytes()); // rain rate
        raw[43] = 6; // uv
        raw[44..46].copy_from_slice(&512u16.to_le_bytes()); // solar
        raw[46..48].copy_from_slice(&25u16.to_le_bytes()); // storm rain
        raw[48..50].copy_from_slice(&0x0105u16.to_le_bytes()); // storm start
        raw[50..52].copy_from_slice(&5u16.to_le_bytes()); // rain day
        raw[52..54].copy_from_slice(&100u16.to_le_bytes()); // rain month
        raw[54..56].copy_from_slice(&250u16.to_le_bytes()); // rain year
        raw[87..89].copy_from_slice(&512u16.to_le_bytes()); // battery volts
        raw[89] = 6; // forecast icon
        raw[90] = 45; // forecast rule
        raw[91..93].copy_from_slice(&601u16.to_le_bytes()); // sunrise 06:01
        raw[93..95].copy_from_slice(&1805u16.to_le_bytes()); // sunset 18:05
        raw[95..97].copy_from_slice(b"\n\r");
        seal(&mut raw);
        raw
    }

    /// Recompute and append the trailing CRC so the frame verifies.
    pub fn seal(raw: &mut RawFrame) {
        let checksum = crc::compute(&raw[..LOOP_FRAME_SIZE - 2]);
        raw[97..99].copy_from_slice(&checksum.to_be_bytes());
    }
}
