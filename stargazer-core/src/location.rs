use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Location as the caller describes it: any combination of fields may be set.
///
/// Example TOML:
/// [location]
/// city = "Berlin,de"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// A location the provider can look up, exactly one way.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Id(u64),
    City(String),
    Coordinates(Coordinates),
}

impl LocationSpec {
    pub fn id(id: u64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.city.is_none() && self.lat.is_none() && self.lon.is_none()
    }

    /// Fields set on `self` win; the rest are taken from `fallback`.
    ///
    /// A spec with any field set replaces the fallback entirely, so a city on
    /// the command line does not get mixed with coordinates from the config.
    pub fn or(self, fallback: Option<LocationSpec>) -> Option<LocationSpec> {
        if self.is_empty() { fallback } else { Some(self) }
    }

    /// Pick the single lookup to send, in priority order id > city > coordinates.
    pub fn resolve(&self) -> Result<Location, ParamsError> {
        if let Some(id) = self.id {
            return Ok(Location::Id(id));
        }

        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            return Ok(Location::City(city.to_string()));
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => validate_coordinates(lat, lon).map(Location::Coordinates),
            (Some(_), None) => Err(ParamsError::invalid("lat given without lon")),
            (None, Some(_)) => Err(ParamsError::invalid("lon given without lat")),
            (None, None) => Err(ParamsError::invalid(
                "expected id, city or {lat, lon} pair",
            )),
        }
    }
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<Coordinates, ParamsError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ParamsError::invalid(format!(
            "latitude must be between -90 and 90, got {lat}"
        )));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ParamsError::invalid(format!(
            "longitude must be between -180 and 180, got {lon}"
        )));
    }

    Ok(Coordinates { lat, lon })
}
