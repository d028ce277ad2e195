//! Pure render functions: the display is a function of
//! (reading, unit preference, UI state) and nothing else. No widget tree is
//! patched in place; every change re-renders from state.

use skycast_core::{UnitPreference, WeatherReading, units};

use crate::controller::{AppState, Phase, Theme};

/// ANSI styling per theme. Cosmetic only.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub heading: &'static str,
    pub value: &'static str,
    pub dim: &'static str,
    pub error: &'static str,
    pub reset: &'static str,
}

const LIGHT: Palette = Palette {
    heading: "\x1b[1;34m",
    value: "\x1b[34m",
    dim: "\x1b[2m",
    error: "\x1b[31m",
    reset: "\x1b[0m",
};

const DARK: Palette = Palette {
    heading: "\x1b[1;36m",
    value: "\x1b[96m",
    dim: "\x1b[90m",
    error: "\x1b[91m",
    reset: "\x1b[0m",
};

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }
}

/// Render the whole display for the current state.
pub fn render(state: &AppState) -> String {
    let p = state.theme.palette();
    let mut out = String::new();

    match state.phase {
        Phase::Loading => out.push_str(&format!("{}Fetching weather…{}\n", p.dim, p.reset)),
        Phase::Listening => out.push_str(&format!("{}Listening...{}\n", p.dim, p.reset)),
        _ => {}
    }

    if let Some(message) = &state.error {
        out.push_str(&format!("{}❌ {message}{}\n", p.error, p.reset));
    }

    if state.result_visible
        && let Some(reading) = &state.reading
    {
        out.push_str(&weather_block(reading, state.unit, p));
    }

    if !state.suggestions.is_empty() {
        out.push_str(&format!("{}Recent:{}\n", p.dim, p.reset));
        for s in &state.suggestions {
            out.push_str(&format!("{}  {s}{}\n", p.dim, p.reset));
        }
    }

    out
}

/// The weather card for one reading under one unit preference.
pub fn weather_block(reading: &WeatherReading, unit: UnitPreference, p: Palette) -> String {
    let location = if reading.country.is_empty() {
        reading.city.clone()
    } else {
        format!("{}, {}", reading.city, reading.country)
    };

    format!(
        "{h}{location}{r}\n\
         {v}{desc}{r}  {d}[{icon}]{r}\n\
         {v}{temp}{r}\n\
         {d}{feels}{r}\n\
         {d}Humidity{r}  {v}{humidity}{r}\n\
         {d}Wind{r}      {v}{wind}{r}\n",
        h = p.heading,
        v = p.value,
        d = p.dim,
        r = p.reset,
        desc = reading.description,
        icon = reading.icon,
        temp = units::format_temperature(reading.temperature_c, unit),
        feels = units::format_feels_like(reading.feels_like_c, unit),
        humidity = units::format_humidity(reading.humidity_pct),
        wind = units::format_wind_speed(reading.wind_speed_mps, unit),
    )
}

/// The sentence handed to the text-to-speech channel after a successful fetch.
pub fn speech_summary(reading: &WeatherReading, unit: UnitPreference) -> String {
    format!(
        "The weather in {}: {}, temperature {}",
        reading.city,
        reading.description,
        units::format_temperature(reading.temperature_c, unit),
    )
}
