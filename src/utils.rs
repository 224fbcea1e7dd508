/// Pure unit-conversion helpers used by the record decoder
///
/// The console reports everything in US customary units; the rest of the
/// pipeline works in metric, so every reading is converted at decode time.

/// Convert a temperature in degrees Fahrenheit to degrees Celsius.
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Convert a wind speed in miles per hour to meters per second.
pub fn mph_to_mps(mph: f64) -> f64 {
    mph * 0.44704
}

/// Convert a barometric pressure in inches of mercury to hectopascals.
pub fn inhg_to_hpa(inhg: f64) -> f64 {
    inhg * 33.8639
}

/// Convert a rain amount in inches to millimeters.
pub fn inches_to_mm(inches: f64) -> f64 {
    inches * 25.4
}
