use async_trait::async_trait;
use reqwest::Client;

use crate::{error::FetchError, query::ForecastQuery};

use super::{ForecastSource, RawResponse};

/// OpenWeatherMap 5 day / 3 hour forecast.
pub const FORECAST_URL: &str = "http://api.openweathermap.org/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    endpoint: String,
    http: Client,
}

impl Default for OpenWeatherSource {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenWeatherSource {
    pub fn new() -> Self {
        Self::with_endpoint(FORECAST_URL)
    }

    /// Point at a different forecast URL, e.g. a proxy or a local mock.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ForecastSource for OpenWeatherSource {
    async fn fetch(&self, query: &ForecastQuery) -> Result<RawResponse, FetchError> {
        let url = format!("{}?{}", self.endpoint, query.to_query_string());

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("OpenWeather request failed: {e}")))?;

        let status = res.status().as_u16();
        let body = res.text().await.map_err(|e| {
            FetchError::Transport(format!("Failed to read OpenWeather response body: {e}"))
        })?;

        tracing::debug!(status, bytes = body.len(), "OpenWeather responded");

        Ok(RawResponse { status, body })
    }
}
