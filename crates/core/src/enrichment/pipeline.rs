//! The geocode → forecast → cache sequence shared by the streaming consumer
//! and the batch refresh workers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use forecal_domain::{WeatherError, WeatherSummary};
use tracing::{debug, instrument, warn};

use super::ports::WeatherStore;
use crate::forecast::ForecastSelector;
use crate::geocoding::GeocodeService;

/// Processing stages of a single delivery, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStage {
    Received,
    Filtered,
    Geocoding,
    ForecastLookup,
    Cached,
    Acknowledged,
}

impl fmt::Display for EnrichmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Received => "received",
            Self::Filtered => "filtered",
            Self::Geocoding => "geocoding",
            Self::ForecastLookup => "forecast_lookup",
            Self::Cached => "cached",
            Self::Acknowledged => "acknowledged",
        })
    }
}

/// A stage-tagged failure; the event is skipped for this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentFailure {
    pub stage: EnrichmentStage,
    pub error: WeatherError,
}

impl fmt::Display for EnrichmentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for EnrichmentFailure {}

/// Successful enrichment. `cached` is false when the weather write failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub summary: WeatherSummary,
    pub cached: bool,
}

pub struct EnrichmentPipeline {
    geocoder: GeocodeService,
    selector: ForecastSelector,
    weather_store: Arc<dyn WeatherStore>,
    weather_ttl: Duration,
}

impl EnrichmentPipeline {
    pub fn new(
        geocoder: GeocodeService,
        selector: ForecastSelector,
        weather_store: Arc<dyn WeatherStore>,
        weather_ttl: Duration,
    ) -> Self {
        Self { geocoder, selector, weather_store, weather_ttl }
    }

    /// Compute and cache the weather at `starts_at` for one event.
    ///
    /// Does not check whether the event is in the past; callers filter.
    #[instrument(skip(self, starts_at), fields(starts_at = %starts_at))]
    pub async fn enrich(
        &self,
        event_id: &str,
        location: &str,
        starts_at: DateTime<FixedOffset>,
    ) -> Result<Enrichment, EnrichmentFailure> {
        let coordinates = self
            .geocoder
            .geocode(location)
            .await
            .map_err(|error| EnrichmentFailure { stage: EnrichmentStage::Geocoding, error })?;

        let summary = self
            .selector
            .select(&coordinates, starts_at)
            .await
            .map_err(|error| EnrichmentFailure { stage: EnrichmentStage::ForecastLookup, error })?;

        let cached = match self.weather_store.set(event_id, &summary, self.weather_ttl).await {
            Ok(()) => {
                debug!(kind = %summary.kind, temperature = summary.temperature, "weather cached");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to cache weather summary");
                false
            }
        };

        Ok(Enrichment { summary, cached })
    }
}
