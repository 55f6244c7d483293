//! Port interfaces for the weather cache

use std::time::Duration;

use async_trait::async_trait;
use forecal_domain::{Result, WeatherSummary};

/// Computed weather keyed by event id, with expiry.
#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Returns [`forecal_domain::WeatherError::NotFound`] on a miss or after
    /// expiry.
    async fn get(&self, event_id: &str) -> Result<WeatherSummary>;

    /// Last writer wins.
    async fn set(&self, event_id: &str, value: &WeatherSummary, ttl: Duration) -> Result<()>;
}
