use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_map_core::{
    Config, Coordinate, LookupError, client_from_config, presentation::WeatherDetails,
};

use crate::repl;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-map", version, about = "Interactive weather map")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for a point or a city, then exit.
    Show {
        /// Latitude of the point.
        #[arg(long, requires = "lon", conflicts_with = "city", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the point.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// City name.
        #[arg(long)]
        city: Option<String>,
    },

    /// Open an interactive map session driven by typed commands.
    Map,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, city } => show(lat, lon, city).await,
            Command::Map => {
                let config = load_config()?;
                repl::run(&config).await
            }
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    config.apply_env();
    Ok(config)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(lat: Option<f64>, lon: Option<f64>, city: Option<String>) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = client_from_config(&config)?;

    let result = match (lat, lon, city) {
        (Some(lat), Some(lon), None) => {
            let coordinate = Coordinate::from_map(lat, lon)
                .with_context(|| format!("Invalid coordinate: {lat}, {lon}"))?;
            client
                .lookup_by_coordinate(coordinate)
                .await
                .map_err(|e| LookupError::for_coordinate(&e))
        }
        (None, None, Some(city)) => client
            .lookup_by_name(&city)
            .await
            .map_err(|e| LookupError::for_name(&city, &e)),
        _ => bail!("Pass either --lat and --lon, or --city"),
    };

    let snapshot = result.inspect_err(|err| {
        tracing::warn!(kind = ?err.kind, "one-shot lookup failed");
    })?;
    println!(
        "{}",
        WeatherDetails::from_snapshot(&snapshot, config.icon_base_url())
    );
    Ok(())
}
