//! OpenWeather wire types not shared with the domain

use forecal_domain::GeocodedLocation;
use serde::Deserialize;

/// One entry of the direct geocoding response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeCandidate {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl From<GeocodeCandidate> for GeocodedLocation {
    fn from(candidate: GeocodeCandidate) -> Self {
        Self {
            name: candidate.name,
            latitude: candidate.lat,
            longitude: candidate.lon,
            country: candidate.country,
        }
    }
}
