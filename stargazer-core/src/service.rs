use std::future::Future;

use serde_json::Value;

use crate::{
    error::{Error, FetchError, ParamsError},
    filter::is_clear,
    model::{ForecastInterval, ForecastPayload, convert},
    provider::{ForecastSource, OpenWeatherSource, RawResponse},
    query::{ForecastQuery, RequestParams},
    sun::is_night,
};

/// Finds forecast intervals that are clear and dark.
#[derive(Debug, Clone, Default)]
pub struct GoodTimes<S = OpenWeatherSource> {
    source: S,
}

impl<S: ForecastSource> GoodTimes<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Validates `params` right away and hands back the request to await.
    ///
    /// Bad input fails here, before anything is sent; everything that can go
    /// wrong once the provider is involved comes out of the future.
    pub fn get_good_times(
        &self,
        params: &RequestParams,
    ) -> Result<impl Future<Output = Result<Vec<ForecastInterval>, FetchError>> + '_, ParamsError>
    {
        let query = ForecastQuery::build(params)?;
        tracing::debug!(?query, "Forecast query built");

        Ok(self.fetch_good_times(query))
    }

    /// `get_good_times` with both failure paths folded into [`Error`].
    pub async fn good_times(&self, params: &RequestParams) -> Result<Vec<ForecastInterval>, Error> {
        Ok(self.get_good_times(params)?.await?)
    }

    async fn fetch_good_times(
        &self,
        query: ForecastQuery,
    ) -> Result<Vec<ForecastInterval>, FetchError> {
        let response = self.source.fetch(&query).await?;

        if !response.is_success() {
            return Err(provider_error(response));
        }

        let payload: ForecastPayload = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::InvalidResponse(format!("forecast payload: {e}")))?;

        pick_good_intervals(payload)
    }
}

/// Convert, keep clear intervals, then keep night intervals.
pub fn pick_good_intervals(payload: ForecastPayload) -> Result<Vec<ForecastInterval>, FetchError> {
    let total = payload.list.len();

    let clear: Vec<ForecastInterval> = convert(payload.list).into_iter().filter(is_clear).collect();

    if clear.is_empty() {
        tracing::debug!(total, "No clear intervals in forecast");
        return Ok(clear);
    }

    let coords = payload.city.map(|city| city.coord).ok_or_else(|| {
        FetchError::InvalidResponse("forecast payload: missing city coordinates".to_string())
    })?;

    let good: Vec<ForecastInterval> =
        clear.into_iter().filter(|interval| is_night(interval, coords)).collect();

    tracing::debug!(total, good = good.len(), "Forecast filtered");
    Ok(good)
}

fn provider_error(response: RawResponse) -> FetchError {
    let message = extract_error_message(&response.body).unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    });

    tracing::debug!(status = response.status, %message, "Provider rejected request");

    FetchError::Provider {
        status: response.status,
        message,
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let from_json = serde_json::from_str::<Value>(trimmed).ok().and_then(|json| {
        json.get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    });

    from_json.or_else(|| Some(truncate_body(trimmed)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
