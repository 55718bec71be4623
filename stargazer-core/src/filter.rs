use crate::model::ForecastInterval;

/// Cloud cover (percent) at and above which the sky no longer counts as clear.
pub const CLEAR_SKY_MAX_CLOUD_COVER: f64 = 30.0;

pub fn is_clear(interval: &ForecastInterval) -> bool {
    interval.forecast.cloud_cover() < CLEAR_SKY_MAX_CLOUD_COVER
}
