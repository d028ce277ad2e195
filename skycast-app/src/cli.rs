use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use skycast_core::{
    Config, FetchWeather, SearchHistory, UnitPreference, WeatherClient,
};

use crate::{controller::Theme, render, session::Session, voice::VoiceBridge};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup with history, units and voice")]
pub struct Cli {
    /// Without a subcommand the interactive session starts.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key.
    Configure,

    /// One-shot lookup without the interactive session.
    Show {
        /// City name. Omit when using --lat/--lon.
        city: Option<String>,

        #[arg(long, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, requires = "lat")]
        lon: Option<f64>,

        /// Display in °F / mph instead of °C / m/s.
        #[arg(long)]
        imperial: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Some(Command::Configure) => configure(config),
            Some(Command::Show { city, lat, lon, imperial }) => {
                show(&config, city, lat.zip(lon), imperial).await
            }
            None => interactive(&config).await,
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key cannot be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    config: &Config,
    city: Option<String>,
    coords: Option<(f64, f64)>,
    imperial: bool,
) -> Result<()> {
    let client = WeatherClient::from_config(config)?;
    let unit = if imperial { UnitPreference::Imperial } else { UnitPreference::Metric };

    let reading = match (&city, coords) {
        (_, Some((lat, lon))) => client.fetch_by_coordinates(lat, lon).await?,
        (Some(city), None) => client.fetch_by_city(city).await?,
        (None, None) => bail!("Provide a city name or --lat/--lon"),
    };

    // One-shot city lookups still feed the recency cache.
    if city.is_some() {
        let mut history = SearchHistory::load(Config::history_file_path()?);
        history.record(&reading.city);
    }

    print!("{}", render::weather_block(&reading, unit, Theme::default().palette()));
    Ok(())
}

async fn interactive(config: &Config) -> Result<()> {
    let client = WeatherClient::from_config(config)?;
    let history = SearchHistory::load(Config::history_file_path()?);
    let voice = VoiceBridge::from_config(&config.voice);

    let fetcher: Arc<dyn FetchWeather> = Arc::new(client);
    Session::new(history, fetcher, voice).run().await
}
