//! Port interfaces for the weather provider

use async_trait::async_trait;
use forecal_domain::{DailyForecast, GeocodedLocation, HourlyForecast, Result};

/// Forecast lookups for a geocoded location.
///
/// Implementations return the provider's sequence unfiltered; picking a
/// point is the selector's job.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    async fn hourly_forecast(&self, location: &GeocodedLocation) -> Result<Vec<HourlyForecast>>;

    async fn daily_forecast(&self, location: &GeocodedLocation) -> Result<Vec<DailyForecast>>;
}
