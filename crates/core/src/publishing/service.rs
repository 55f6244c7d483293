//! Publisher side of the calendar service

use std::sync::Arc;

use forecal_domain::{Event, EventCreated, Result};
use tracing::{info, instrument, warn};

use super::ports::EventPublisher;
use crate::refresh::ports::FutureEventIndex;

/// Indexes a persisted event for batch refresh and announces it.
#[derive(Clone)]
pub struct EventChangePublisher {
    publisher: Arc<dyn EventPublisher>,
    index: Arc<dyn FutureEventIndex>,
}

impl EventChangePublisher {
    pub fn new(publisher: Arc<dyn EventPublisher>, index: Arc<dyn FutureEventIndex>) -> Self {
        Self { publisher, index }
    }

    /// Index failures are logged; publish failures are returned.
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn event_persisted(&self, event: &Event) -> Result<()> {
        if let Err(err) = self.index.store(event).await {
            warn!(error = %err, "failed to index event for batch refresh");
        }

        self.publisher.publish_event_created(&EventCreated::from(event)).await?;
        info!("published event.created");
        Ok(())
    }
}
