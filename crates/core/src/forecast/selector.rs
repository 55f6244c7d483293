//! Picks the forecast point describing an event's start
//!
//! Lead time decides the granularity: under 48h the hourly sequence, under
//! 168h the daily sequence, anything further is rejected without calling the
//! provider. Hourly points are stamped on UTC hours, so the hourly target
//! is the UTC instant truncated to the hour. The daily point and the day part
//! are read in the target's own offset.

use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, FixedOffset, Timelike, Utc};
use forecal_domain::constants::{
    DAILY_FORECAST_POINT_HOUR, DAILY_FORECAST_WINDOW_HOURS, HOURLY_FORECAST_WINDOW_HOURS,
};
use forecal_domain::{
    DayPart, ForecastGranularity, GeocodedLocation, Result, WeatherError, WeatherInfo,
    WeatherSummary,
};
use tracing::{debug, instrument};

use super::ports::ForecastProvider;
use crate::clock::Clock;

/// Which forecast point to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastBucket {
    /// Hourly point stamped exactly at the target's hour.
    Hourly { point_at: DateTime<FixedOffset> },
    /// Daily point stamped at midday of the target's date, read for `part`.
    Daily { point_at: DateTime<FixedOffset>, part: DayPart },
}

impl ForecastBucket {
    pub fn granularity(&self) -> ForecastGranularity {
        match self {
            Self::Hourly { .. } => ForecastGranularity::Hourly,
            Self::Daily { .. } => ForecastGranularity::Daily,
        }
    }

    /// Epoch seconds the provider's `dt` must equal.
    pub fn point_timestamp(&self) -> i64 {
        match self {
            Self::Hourly { point_at } | Self::Daily { point_at, .. } => point_at.timestamp(),
        }
    }
}

/// Decide which forecast point describes `target` as seen from `now`.
///
/// Returns [`WeatherError::TooFarInFuture`] when the lead time reaches the
/// daily window.
pub fn select_bucket(now: DateTime<Utc>, target: DateTime<FixedOffset>) -> Result<ForecastBucket> {
    let target_hour = truncate_to_hour(target)?;
    let lead = target_hour - now;

    if lead < Duration::hours(HOURLY_FORECAST_WINDOW_HOURS) {
        return Ok(ForecastBucket::Hourly { point_at: target_hour.with_timezone(target.offset()) });
    }

    if lead < Duration::hours(DAILY_FORECAST_WINDOW_HOURS) {
        return Ok(ForecastBucket::Daily {
            point_at: midday_of(target)?,
            part: DayPart::for_hour(target.hour()),
        });
    }

    Err(WeatherError::TooFarInFuture { lead_hours: lead.num_hours() })
}

fn truncate_to_hour(target: DateTime<FixedOffset>) -> Result<DateTime<Utc>> {
    target
        .with_timezone(&Utc)
        .duration_trunc(Duration::hours(1))
        .map_err(|err| WeatherError::Internal(format!("cannot truncate {target} to the hour: {err}")))
}

fn midday_of(target: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
    target
        .date_naive()
        .and_hms_opt(DAILY_FORECAST_POINT_HOUR, 0, 0)
        .and_then(|midday| midday.and_local_timezone(*target.offset()).single())
        .ok_or_else(|| WeatherError::Internal(format!("no midday for {target}")))
}

/// Chooses and reads the forecast point for an event start.
#[derive(Clone)]
pub struct ForecastSelector {
    provider: Arc<dyn ForecastProvider>,
    clock: Arc<dyn Clock>,
}

impl ForecastSelector {
    pub fn new(provider: Arc<dyn ForecastProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { provider, clock }
    }

    /// Weather at `target` for `location`, using the injected clock for `now`.
    pub async fn select(
        &self,
        location: &GeocodedLocation,
        target: DateTime<FixedOffset>,
    ) -> Result<WeatherSummary> {
        self.select_at(location, self.clock.now(), target).await
    }

    /// Weather at `target` for `location` as seen from `now`.
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn select_at(
        &self,
        location: &GeocodedLocation,
        now: DateTime<Utc>,
        target: DateTime<FixedOffset>,
    ) -> Result<WeatherSummary> {
        let bucket = select_bucket(now, target)?;
        let wanted = bucket.point_timestamp();
        debug!(granularity = %bucket.granularity(), point_at = wanted, "selected forecast bucket");

        match bucket {
            ForecastBucket::Hourly { point_at } => {
                let points = self.provider.hourly_forecast(location).await?;
                let point = points.iter().find(|p| p.dt == wanted).ok_or_else(|| {
                    WeatherError::ForecastPointNotFound(format!("no hourly point at {point_at}"))
                })?;
                summarize(&point.weather, point.temp)
            }
            ForecastBucket::Daily { point_at, part } => {
                let points = self.provider.daily_forecast(location).await?;
                let point = points.iter().find(|p| p.dt == wanted).ok_or_else(|| {
                    WeatherError::ForecastPointNotFound(format!("no daily point at {point_at}"))
                })?;
                summarize(&point.weather, point.temp.for_part(part))
            }
        }
    }
}

fn summarize(conditions: &[WeatherInfo], temperature: f64) -> Result<WeatherSummary> {
    let primary = conditions.first().ok_or_else(|| {
        WeatherError::ExternalProvider("forecast point carries no weather conditions".to_string())
    })?;

    Ok(WeatherSummary {
        kind: primary.main.clone(),
        description: primary.description.clone(),
        temperature,
    })
}
