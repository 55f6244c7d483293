//! Port interfaces for geocoding

use async_trait::async_trait;
use forecal_domain::{GeocodedLocation, Result};

/// Cache of geocoded locations keyed by the raw location string.
///
/// Keys are case-sensitive and never normalized.
#[async_trait]
pub trait GeocodeStore: Send + Sync {
    /// Returns [`forecal_domain::WeatherError::NotFound`] on a miss.
    async fn get(&self, location: &str) -> Result<GeocodedLocation>;

    /// Fully replaces any existing value.
    async fn set(&self, location: &str, value: &GeocodedLocation) -> Result<()>;
}

/// External geocoding lookup.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Candidates for a location, best match first. May be empty.
    async fn geocode(&self, location: &str) -> Result<Vec<GeocodedLocation>>;
}
