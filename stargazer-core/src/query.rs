use url::form_urlencoded;

use crate::{
    error::ParamsError,
    location::{Location, LocationSpec},
};

/// Query parameter name the provider expects the credential under.
pub const API_KEY_PARAM: &str = "appid";

/// Everything needed to ask the provider for a forecast.
#[derive(Clone, Default, PartialEq)]
pub struct RequestParams {
    pub location: Option<LocationSpec>,
    pub api_key: Option<String>,
}

impl RequestParams {
    pub fn new(location: LocationSpec, api_key: impl Into<String>) -> Self {
        Self {
            location: Some(location),
            api_key: Some(api_key.into()),
        }
    }
}

/// Flat query parameters for the forecast endpoint.
#[derive(Clone, PartialEq)]
pub struct ForecastQuery {
    pairs: Vec<(&'static str, String)>,
}

impl ForecastQuery {
    /// The credential is checked before the location, so a request that gets
    /// both wrong reports the missing key.
    pub fn build(params: &RequestParams) -> Result<Self, ParamsError> {
        let api_key = params
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ParamsError::MissingApiKey)?;

        let location = params
            .location
            .as_ref()
            .ok_or_else(|| ParamsError::InvalidParams("object expected".to_string()))?
            .resolve()?;

        let mut pairs = location_pairs(&location);
        pairs.push((API_KEY_PARAM, api_key.to_string()));

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// URL-encoded form, ready to append after `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }
}

// Hand-written so the credential never ends up in logs.
impl std::fmt::Debug for RequestParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestParams")
            .field("location", &self.location)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl std::fmt::Debug for ForecastQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.pairs {
            if *key == API_KEY_PARAM {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

fn location_pairs(location: &Location) -> Vec<(&'static str, String)> {
    match location {
        Location::Id(id) => vec![("id", id.to_string())],
        Location::City(city) => vec![("q", city.clone())],
        Location::Coordinates(coords) => vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_pairs(query: &ForecastQuery) -> Vec<(&'static str, String)> {
        let mut pairs = query.pairs().to_vec();
        pairs.sort();
        pairs
    }

    #[test]
    fn builds_id_query() {
        let query = ForecastQuery::build(&RequestParams::new(LocationSpec::id(12345), "myapikey"))
            .expect("valid params");

        assert_eq!(
            sorted_pairs(&query),
            vec![("appid", "myapikey".to_string()), ("id", "12345".to_string())]
        );
    }

    #[test]
    fn builds_city_query() {
        let query =
            ForecastQuery::build(&RequestParams::new(LocationSpec::city("Berlin,de"), "myapikey"))
                .expect("valid params");

        assert_eq!(
            sorted_pairs(&query),
            vec![("appid", "myapikey".to_string()), ("q", "Berlin,de".to_string())]
        );
    }

    #[test]
    fn builds_coordinates_query() {
        let query = ForecastQuery::build(&RequestParams::new(
            LocationSpec::coordinates(56.78, 12.34),
            "myapikey",
        ))
        .expect("valid params");

        assert_eq!(query.get("lat"), Some("56.78"));
        assert_eq!(query.get("lon"), Some("12.34"));
        assert_eq!(query.get("appid"), Some("myapikey"));
        assert_eq!(query.pairs().len(), 3);
    }

    #[test]
    fn missing_key_is_reported_before_bad_location() {
        let params = RequestParams {
            location: Some(LocationSpec::default()),
            api_key: None,
        };

        assert_eq!(ForecastQuery::build(&params), Err(ParamsError::MissingApiKey));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let params = RequestParams::new(LocationSpec::city("Berlin,de"), "  ");
        assert_eq!(ForecastQuery::build(&params), Err(ParamsError::MissingApiKey));
    }

    #[test]
    fn absent_location_is_invalid() {
        let params = RequestParams {
            location: None,
            api_key: Some("myapikey".into()),
        };

        assert!(matches!(
            ForecastQuery::build(&params),
            Err(ParamsError::InvalidParams(_))
        ));
    }

    #[test]
    fn query_string_is_url_encoded() {
        let query =
            ForecastQuery::build(&RequestParams::new(LocationSpec::city("São Paulo,br"), "k&y"))
                .expect("valid params");

        assert_eq!(query.to_query_string(), "q=S%C3%A3o+Paulo%2Cbr&appid=k%26y");
    }

    #[test]
    fn debug_output_hides_the_key() {
        let query = ForecastQuery::build(&RequestParams::new(LocationSpec::id(1), "secret"))
            .expect("valid params");

        let rendered = format!("{query:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn params_debug_output_hides_the_key() {
        let params = RequestParams::new(LocationSpec::city("Berlin,de"), "secret");

        let rendered = format!("{params:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("Berlin,de"));

        assert!(format!("{:?}", RequestParams::default()).contains("api_key: None"));
    }
}
