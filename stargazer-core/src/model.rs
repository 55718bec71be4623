use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

use crate::location::Coordinates;

/// Length of one forecast sample: the provider reports every 3 hours.
pub const INTERVAL_MILLIS: i64 = 10_800_000;

/// One forecast sample, kept exactly as the provider sent it.
///
/// Only `dt` and `clouds.all` are read; both are checked while decoding so the
/// rest of the pipeline can rely on them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecastRecord {
    dt: i64,
    cloud_cover: f64,
    raw: Value,
}

impl RawForecastRecord {
    /// Sample time, Unix seconds.
    pub fn dt(&self) -> i64 {
        self.dt
    }

    /// Cloud cover, percent.
    pub fn cloud_cover(&self) -> f64 {
        self.cloud_cover
    }

    pub fn as_json(&self) -> &Value {
        &self.raw
    }

    pub fn into_json(self) -> Value {
        self.raw
    }

    fn sampled_at(&self) -> DateTime<Utc> {
        // Range checked in `from_json`.
        DateTime::from_timestamp(self.dt, 0).unwrap_or_default()
    }

    pub fn from_json(raw: Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct Probe {
            dt: i64,
            clouds: Clouds,
        }

        #[derive(Deserialize)]
        struct Clouds {
            all: f64,
        }

        let probe = Probe::deserialize(&raw).map_err(|e| format!("forecast record: {e}"))?;

        let representable = DateTime::from_timestamp(probe.dt, 0)
            .and_then(|from| from.checked_add_signed(TimeDelta::milliseconds(INTERVAL_MILLIS)))
            .is_some();
        if !representable {
            return Err(format!("forecast record: dt {} is out of range", probe.dt));
        }

        Ok(Self {
            dt: probe.dt,
            cloud_cover: probe.clouds.all,
            raw,
        })
    }
}

impl<'de> Deserialize<'de> for RawForecastRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        RawForecastRecord::from_json(raw).map_err(de::Error::custom)
    }
}

impl Serialize for RawForecastRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

/// The 3-hour period `[from, to)` one sample covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastInterval {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub forecast: RawForecastRecord,
}

impl From<RawForecastRecord> for ForecastInterval {
    fn from(forecast: RawForecastRecord) -> Self {
        let from = forecast.sampled_at();
        let to = from + TimeDelta::milliseconds(INTERVAL_MILLIS);
        Self { from, to, forecast }
    }
}

/// Turn samples into intervals, keeping their order.
pub fn convert(records: Vec<RawForecastRecord>) -> Vec<ForecastInterval> {
    records.into_iter().map(ForecastInterval::from).collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct City {
    pub coord: Coordinates,
}

/// Body of a successful forecast response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub city: Option<City>,
    pub list: Vec<RawForecastRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(dt: i64, clouds: f64) -> RawForecastRecord {
        RawForecastRecord::from_json(json!({ "dt": dt, "clouds": { "all": clouds } }))
            .expect("valid record")
    }

    #[test]
    fn interval_spans_three_hours_from_sample_time() {
        for dt in [0_i64, 1_480_629_600, -86_400, 4_102_444_800] {
            let interval = ForecastInterval::from(record(dt, 0.0));

            assert_eq!(interval.from.timestamp_millis(), dt * 1000);
            assert_eq!((interval.to - interval.from).num_milliseconds(), INTERVAL_MILLIS);
        }
    }

    #[test]
    fn convert_preserves_order() {
        let intervals = convert(vec![record(300, 0.0), record(100, 0.0), record(200, 0.0)]);
        let starts: Vec<i64> = intervals.iter().map(|i| i.from.timestamp()).collect();

        assert_eq!(starts, vec![300, 100, 200]);
    }

    #[test]
    fn record_keeps_unknown_fields_verbatim() {
        let original = json!({
            "dt": 1_480_629_600,
            "clouds": { "all": 12 },
            "main": { "temp": 271.3, "humidity": 86 },
            "weather": [{ "id": 800, "main": "Clear" }],
            "dt_txt": "2016-12-01 22:00:00"
        });

        let parsed: RawForecastRecord = serde_json::from_value(original.clone()).expect("record");

        assert_eq!(parsed.cloud_cover(), 12.0);
        assert_eq!(parsed.as_json(), &original);
        assert_eq!(serde_json::to_value(&parsed).expect("serialize"), original);
    }

    #[test]
    fn record_without_clouds_is_rejected() {
        let err = RawForecastRecord::from_json(json!({ "dt": 1 })).unwrap_err();
        assert!(err.contains("clouds"));
    }

    #[test]
    fn record_with_text_timestamp_is_rejected() {
        let err = RawForecastRecord::from_json(json!({ "dt": "soon", "clouds": { "all": 0 } }))
            .unwrap_err();
        assert!(err.starts_with("forecast record"));
    }

    #[test]
    fn record_beyond_calendar_range_is_rejected() {
        let err = RawForecastRecord::from_json(json!({ "dt": i64::MAX, "clouds": { "all": 0 } }))
            .unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn payload_city_is_optional() {
        let payload: ForecastPayload = serde_json::from_str(r#"{"list": []}"#).expect("payload");

        assert!(payload.city.is_none());
        assert!(payload.list.is_empty());
    }

    #[test]
    fn payload_reads_city_coordinates() {
        let payload: ForecastPayload = serde_json::from_str(
            r#"{"city": {"name": "Berlin", "coord": {"lat": 52.524368, "lon": 13.41053}}, "list": []}"#,
        )
        .expect("payload");

        assert_eq!(
            payload.city.map(|c| c.coord),
            Some(Coordinates { lat: 52.524368, lon: 13.41053 })
        );
    }
}
