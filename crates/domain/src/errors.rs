//! Error types used throughout the enrichment pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for forecal
///
/// Every per-event variant leads to the event being skipped for the current
/// enrichment cycle. Only [`WeatherError::Connectivity`] is fatal to a process.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum WeatherError {
    /// Cache miss. Recovered locally by falling through to the provider.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No geocoded location could be found for {0}")]
    NoLocationFound(String),

    #[error("Forecast point not found: {0}")]
    ForecastPointNotFound(String),

    /// Lead time (in whole hours) is beyond the daily forecast window.
    #[error("Event too far in the future ({lead_hours}h ahead)")]
    TooFarInFuture { lead_hours: i64 },

    /// Non-success response or malformed payload from the weather provider.
    #[error("External provider error: {0}")]
    ExternalProvider(String),

    /// Cache persistence failure. Logged by callers, never propagated.
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Cache read failure other than a miss.
    #[error("Store error: {0}")]
    Store(String),

    /// Broker or cache store unreachable.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WeatherError {
    /// Stable label for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::NoLocationFound(_) => "no_location_found",
            Self::ForecastPointNotFound(_) => "forecast_point_not_found",
            Self::TooFarInFuture { .. } => "too_far_in_future",
            Self::ExternalProvider(_) => "external_provider",
            Self::StoreWrite(_) => "store_write",
            Self::Store(_) => "store",
            Self::Connectivity(_) => "connectivity",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this error should terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// Result type alias for forecal operations
pub type Result<T> = std::result::Result<T, WeatherError>;
