//! Port interfaces for the future events index

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forecal_domain::{Event, Result};

/// Time-ordered index of events that have not started yet.
///
/// "Now" is taken from the implementation's clock.
#[async_trait]
pub trait FutureEventIndex: Send + Sync {
    /// Write the event payload, and index it when it starts after now.
    /// Re-storing an event replaces its score.
    async fn store(&self, event: &Event) -> Result<()>;

    /// Indexed events starting in `[now, max]`, ascending by start time.
    async fn get_future_events(&self, max: DateTime<Utc>) -> Result<Vec<Event>>;

    /// Drop index entries that started before now. Idempotent.
    /// Returns how many entries were removed.
    async fn remove_expired(&self) -> Result<u64>;
}
