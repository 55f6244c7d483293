//! Geocoded locations and computed weather summaries

use serde::{Deserialize, Serialize};

/// Result of geocoding a free-text location.
///
/// Cached indefinitely under the exact location string used for the lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
}

/// Weather at an event's start, derived from a single forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(rename = "temp", alias = "temperature")]
    pub temperature: f64,
}
