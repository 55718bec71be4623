//! Core library for the `stargazer` CLI.
//!
//! Given a location and an OpenWeatherMap API key, fetches the 5 day / 3 hour
//! forecast and keeps the intervals that are both clear (under 30% cloud
//! cover) and dark (after astronomical dusk).
//!
//! This crate defines:
//! - Location resolution and query construction
//! - The forecast transport seam and its OpenWeather implementation
//! - Interval conversion and the clear-sky / night filters
//! - Configuration & credentials handling
//!
//! It is used by `stargazer-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod filter;
pub mod location;
pub mod model;
pub mod provider;
pub mod query;
pub mod service;
pub mod sun;

pub use config::Config;
pub use error::{Error, FetchError, ParamsError};
pub use location::{Coordinates, Location, LocationSpec};
pub use model::{ForecastInterval, RawForecastRecord};
pub use provider::{ForecastSource, OpenWeatherSource, RawResponse};
pub use query::{ForecastQuery, RequestParams};
pub use service::GoodTimes;

/// One-shot helper: query the public OpenWeather endpoint and return the good
/// intervals.
pub async fn get_good_times(params: &RequestParams) -> Result<Vec<ForecastInterval>, Error> {
    GoodTimes::new(OpenWeatherSource::new()).good_times(params).await
}
