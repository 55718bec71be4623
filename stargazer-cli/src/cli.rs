use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use stargazer_core::{
    Config, GoodTimes, LocationSpec, OpenWeatherSource, ParamsError, RequestParams,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "stargazer",
    version,
    about = "Find clear night skies in the weather forecast"
)]
pub struct Cli {
    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional default city.
    Configure,

    /// Show upcoming forecast intervals that are clear and dark.
    Show(ShowArgs),

    /// Print where the configuration file lives.
    ConfigPath,
}

/// Location flags are passed through as given; precedence and validation
/// happen in the core (id, then city, then lat/lon).
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// OpenWeather city id.
    #[arg(long)]
    pub id: Option<u64>,

    /// City name, optionally with country code, e.g. "Berlin,de".
    #[arg(long)]
    pub city: Option<String>,

    /// Latitude in decimal degrees (requires --lon).
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees (requires --lat).
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// API key to use instead of the configured one.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print the intervals, including the raw forecast records, as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    pub fn location(&self) -> LocationSpec {
        LocationSpec {
            id: self.id,
            city: self.city.clone(),
            lat: self.lat,
            lon: self.lon,
        }
    }

    /// Command-line values first, then environment, then the config file.
    pub fn request_params(&self, config: &Config) -> RequestParams {
        RequestParams {
            location: self.location().or(config.location.clone()),
            api_key: config.resolve_api_key(self.api_key.clone()),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show(args) => show(args).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }

    let city = Text::new("Default city (optional):")
        .with_help_message("e.g. Berlin,de; leave empty to keep the current one")
        .prompt()
        .context("Failed to read default city")?;

    config.upsert(api_key.trim().to_string(), Some(city));
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let config = Config::load()?.with_env();
    let params = args.request_params(&config);

    let source = match &config.endpoint {
        Some(endpoint) => OpenWeatherSource::with_endpoint(endpoint.clone()),
        None => OpenWeatherSource::new(),
    };
    tracing::debug!(endpoint = source.endpoint(), "Using forecast endpoint");

    let service = GoodTimes::new(source);
    let pending = service.get_good_times(&params).map_err(with_hint)?;
    let intervals = pending.await.context("Forecast request failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&intervals)?);
    } else {
        print!("{}", output::render(&intervals, &Local));
    }

    Ok(())
}

fn with_hint(err: ParamsError) -> anyhow::Error {
    match err {
        ParamsError::MissingApiKey => anyhow!(
            "{err}.\n\
             Hint: run `stargazer configure`, set OPENWEATHER_API_KEY or pass --api-key."
        ),
        ParamsError::InvalidParams(_) => anyhow!(
            "{err}.\n\
             Hint: pass --id, --city or both --lat and --lon, or store a default with `stargazer configure`."
        ),
    }
}
