//! Pure unit conversion and display formatting.
//!
//! Readings are stored in metric; everything here is applied at render time.
//! Same reading + same preference always produces the same string, which is
//! what makes "switch unit without refetch" safe.

use crate::model::UnitPreference;

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn to_mph(meters_per_second: f64) -> f64 {
    meters_per_second * 2.236936
}

/// `"10.0°C"` / `"50.0°F"`
pub fn format_temperature(celsius: f64, unit: UnitPreference) -> String {
    match unit {
        UnitPreference::Metric => format!("{celsius:.1}°C"),
        UnitPreference::Imperial => format!("{:.1}°F", to_fahrenheit(celsius)),
    }
}

/// `"Feels like 9.0°C"`
pub fn format_feels_like(celsius: f64, unit: UnitPreference) -> String {
    format!("Feels like {}", format_temperature(celsius, unit))
}

/// `"5.0 m/s"` / `"11.2 mph"`
pub fn format_wind_speed(meters_per_second: f64, unit: UnitPreference) -> String {
    match unit {
        UnitPreference::Metric => format!("{meters_per_second:.1} m/s"),
        UnitPreference::Imperial => format!("{:.1} mph", to_mph(meters_per_second)),
    }
}

pub fn format_humidity(humidity_pct: u8) -> String {
    format!("{humidity_pct}%")
}
