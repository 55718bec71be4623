use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, query::ForecastQuery};

pub mod openweather;

pub use openweather::OpenWeatherSource;

/// Status and body of a forecast response, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can answer a forecast query with a single GET.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, query: &ForecastQuery) -> Result<RawResponse, FetchError>;
}
