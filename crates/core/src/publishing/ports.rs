//! Port interfaces for outbound broker messages

use async_trait::async_trait;
use forecal_domain::{EventCreated, Result};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an `event.created` notification.
    async fn publish_event_created(&self, message: &EventCreated) -> Result<()>;
}
