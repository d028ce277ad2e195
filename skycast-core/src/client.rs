use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{config::Config, error::FetchError, model::WeatherReading};

/// Abstraction over the weather fetch so the app layer can be driven by a
/// scripted fake in tests.
#[async_trait]
pub trait FetchWeather: Send + Sync {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherReading, FetchError>;
    async fn fetch_by_coordinates(&self, lat: f64, lon: f64)
    -> Result<WeatherReading, FetchError>;
}

/// Thin wrapper over one HTTP GET to the OpenWeatherMap current-weather
/// endpoint. Requests always ask for metric units; display conversion is
/// applied locally at render time.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl WeatherClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            http,
        })
    }

    /// API-key presence is checked here, at call time, not at construction.
    fn api_key(&self) -> Result<&str, FetchError> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or(FetchError::Configuration)
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<WeatherReading, FetchError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let parsed: OwCurrentResponse = res
            .json()
            .await
            .map_err(|e| FetchError::Unknown(format!("failed to parse weather response: {e}")))?;

        Ok(parsed.into_reading())
    }
}

#[async_trait]
impl FetchWeather for WeatherClient {
    async fn fetch_by_city(&self, city: &str) -> Result<WeatherReading, FetchError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(FetchError::Validation);
        }
        let key = self.api_key()?;

        let params = [
            ("q", city.to_string()),
            ("appid", key.to_string()),
            ("units", "metric".to_string()),
        ];
        self.fetch(&params).await
    }

    async fn fetch_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherReading, FetchError> {
        let key = self.api_key()?;

        let params = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", key.to_string()),
            ("units", "metric".to_string()),
        ];
        self.fetch(&params).await
    }
}

fn status_error(status: StatusCode) -> FetchError {
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound,
        StatusCode::UNAUTHORIZED => FetchError::Auth,
        s if s.is_server_error() => FetchError::ServiceUnavailable,
        s => FetchError::Provider(s.as_u16()),
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Network
    } else {
        FetchError::Unknown(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize, Default)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    dt: i64,
}

impl OwCurrentResponse {
    fn into_reading(self) -> WeatherReading {
        let observed_at = unix_to_utc(self.dt).unwrap_or_else(Utc::now);

        let (description, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), "01d".to_string()));

        WeatherReading {
            city: self.name,
            country: self.sys.country,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            description,
            icon,
            observed_at,
        }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}
