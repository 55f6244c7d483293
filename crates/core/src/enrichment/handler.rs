//! Handling of a single `event.created` delivery
//!
//! Every path ends in [`EnrichmentStage::Acknowledged`]: the transport acks
//! once [`EnrichmentHandler::handle_delivery`] returns, whatever the outcome.

use std::sync::Arc;

use forecal_domain::{EventCreated, WeatherError, WeatherSummary};
use tracing::{debug, info, instrument, warn};

use super::pipeline::{EnrichmentFailure, EnrichmentPipeline, EnrichmentStage};
use crate::clock::Clock;

/// How a delivery left the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    /// Body was not a valid `EventCreated`.
    Undecodable(WeatherError),
    /// Event already started; nothing was looked up or written.
    SkippedPast { event_id: String },
    Failed { event_id: String, failure: EnrichmentFailure },
    Enriched { event_id: String, summary: WeatherSummary, cached: bool },
}

impl EnrichmentOutcome {
    /// Last stage reached before acknowledgement.
    pub fn last_stage(&self) -> EnrichmentStage {
        match self {
            Self::Undecodable(_) => EnrichmentStage::Received,
            Self::SkippedPast { .. } => EnrichmentStage::Filtered,
            Self::Failed { failure, .. } => failure.stage,
            Self::Enriched { .. } => EnrichmentStage::Cached,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, Self::Enriched { .. })
    }
}

/// Streaming entry point: decode, filter, then run the pipeline.
#[derive(Clone)]
pub struct EnrichmentHandler {
    pipeline: Arc<EnrichmentPipeline>,
    clock: Arc<dyn Clock>,
}

impl EnrichmentHandler {
    pub fn new(pipeline: Arc<EnrichmentPipeline>, clock: Arc<dyn Clock>) -> Self {
        Self { pipeline, clock }
    }

    /// Process one raw message body. Never fails; failures are logged and
    /// reported in the outcome.
    pub async fn handle_delivery(&self, body: &[u8]) -> EnrichmentOutcome {
        match EventCreated::from_slice(body) {
            Ok(message) => self.handle_event(&message).await,
            Err(err) => {
                let error = WeatherError::InvalidInput(format!("undecodable event.created body: {err}"));
                warn!(error = %error, body_len = body.len(), "dropping undecodable message");
                EnrichmentOutcome::Undecodable(error)
            }
        }
    }

    /// Process one decoded notification.
    #[instrument(skip(self, message), fields(event_id = %message.id, location = %message.location))]
    pub async fn handle_event(&self, message: &EventCreated) -> EnrichmentOutcome {
        let event_id = message.id.clone();
        let now = self.clock.now();

        if message.starts_at.with_timezone(&chrono::Utc) <= now {
            debug!(starts_at = %message.starts_at, "event already started, skipping");
            return EnrichmentOutcome::SkippedPast { event_id };
        }

        match self.pipeline.enrich(&message.id, &message.location, message.starts_at).await {
            Ok(enrichment) => {
                info!(
                    kind = %enrichment.summary.kind,
                    temperature = enrichment.summary.temperature,
                    cached = enrichment.cached,
                    "event enriched with weather"
                );
                EnrichmentOutcome::Enriched {
                    event_id,
                    summary: enrichment.summary,
                    cached: enrichment.cached,
                }
            }
            Err(failure) => {
                warn!(stage = %failure.stage, error = %failure.error, "enrichment failed, skipping event");
                EnrichmentOutcome::Failed { event_id, failure }
            }
        }
    }
}
