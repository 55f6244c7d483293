//! Cache-aside geocoding

use std::sync::Arc;

use forecal_domain::{GeocodedLocation, Result, WeatherError};
use tracing::{debug, error, instrument, warn};

use super::ports::{GeocodeStore, GeocodingProvider};

/// Resolves locations through the geocode cache, falling back to the provider.
///
/// Concurrent misses for the same location each call the provider; the
/// cache write is last-writer-wins.
#[derive(Clone)]
pub struct GeocodeService {
    store: Arc<dyn GeocodeStore>,
    provider: Arc<dyn GeocodingProvider>,
}

impl GeocodeService {
    pub fn new(store: Arc<dyn GeocodeStore>, provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { store, provider }
    }

    /// Resolve `location` to coordinates.
    ///
    /// Only provider failures and an empty candidate list are returned as
    /// errors. Cache read and write failures are logged and otherwise
    /// ignored.
    #[instrument(skip(self))]
    pub async fn geocode(&self, location: &str) -> Result<GeocodedLocation> {
        match self.store.get(location).await {
            Ok(cached) => {
                debug!("geocode cache hit");
                return Ok(cached);
            }
            Err(WeatherError::NotFound(_)) => debug!("geocode cache miss"),
            Err(err) => error!(error = %err, "geocode cache read failed, querying provider"),
        }

        let resolved = self
            .provider
            .geocode(location)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NoLocationFound(location.to_string()))?;

        if let Err(err) = self.store.set(location, &resolved).await {
            warn!(error = %err, "failed to cache geocoded location");
        }

        Ok(resolved)
    }
}
