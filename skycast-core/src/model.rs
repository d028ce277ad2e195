use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fetched weather snapshot, always at canonical metric units.
///
/// Replaces any prior reading on a successful fetch; never mutated afterwards.
/// Display conversion happens at render time, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub description: String,
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

/// The user's chosen display unit system, orthogonal to the stored reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitPreference {
    #[default]
    Metric,
    Imperial,
}

impl UnitPreference {
    pub fn toggled(self) -> Self {
        match self {
            UnitPreference::Metric => UnitPreference::Imperial,
            UnitPreference::Imperial => UnitPreference::Metric,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitPreference::Metric => "metric",
            UnitPreference::Imperial => "imperial",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_is_identity() {
        for unit in [UnitPreference::Metric, UnitPreference::Imperial] {
            assert_eq!(unit.toggled().toggled(), unit);
        }
    }
}
