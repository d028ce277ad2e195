//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client and its typed error set
//! - Shared domain models (readings, unit preference)
//! - Unit conversion & display formatting
//! - The persisted search history store
//!
//! It is used by `skycast-app`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod units;

pub use client::{FetchWeather, WeatherClient};
pub use config::Config;
pub use error::FetchError;
pub use history::SearchHistory;
pub use model::{UnitPreference, WeatherReading};
