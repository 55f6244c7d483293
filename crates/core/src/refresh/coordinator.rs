//! One batch refresh run over the future events index

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use forecal_domain::{Event, RefreshConfig, Result};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::pool::{PoolReport, WorkerPool};
use super::ports::FutureEventIndex;
use crate::clock::Clock;
use crate::enrichment::EnrichmentPipeline;

/// Upper bound on waiting for the background sweep when a run finishes.
const SWEEP_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// How far ahead of now to refresh.
    pub horizon: Duration,
    pub workers: usize,
}

impl RefreshSettings {
    pub fn from_config(config: &RefreshConfig) -> Self {
        let horizon = i64::try_from(config.horizon_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .unwrap_or(Duration::MAX);
        Self { horizon, workers: config.workers }
    }
}

/// Summary of a refresh run, logged on completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub total: usize,
    pub processed: usize,
    pub enriched: usize,
    pub failed: usize,
    pub cancelled: bool,
}

impl From<PoolReport> for RefreshReport {
    fn from(pool: PoolReport) -> Self {
        Self {
            total: pool.total,
            processed: pool.completed,
            enriched: pool.succeeded,
            failed: pool.failed(),
            cancelled: pool.cancelled,
        }
    }
}

pub struct BatchRefreshCoordinator {
    index: Arc<dyn FutureEventIndex>,
    pipeline: Arc<EnrichmentPipeline>,
    clock: Arc<dyn Clock>,
    settings: RefreshSettings,
}

impl BatchRefreshCoordinator {
    pub fn new(
        index: Arc<dyn FutureEventIndex>,
        pipeline: Arc<EnrichmentPipeline>,
        clock: Arc<dyn Clock>,
        settings: RefreshSettings,
    ) -> Self {
        Self { index, pipeline, clock, settings }
    }

    /// Purge expired index entries in the background. Errors are logged.
    pub fn sweep_expired(&self) -> JoinHandle<()> {
        let index = Arc::clone(&self.index);
        tokio::spawn(async move {
            match index.remove_expired().await {
                Ok(removed) => debug!(removed, "expired index entries purged"),
                Err(err) => warn!(error = %err, "failed to purge expired index entries"),
            }
        })
    }

    /// Re-enrich every event starting within the horizon.
    ///
    /// Fails only when the index query fails. Per-event failures are counted
    /// in the report. Cancelling `cancel` stops dispatching new events and
    /// returns a partial report once in-flight events finish.
    ///
    /// The expired-entry sweep runs alongside and is given up to
    /// `SWEEP_GRACE` to finish before returning; its outcome never changes
    /// the result.
    #[instrument(skip(self, cancel), fields(workers = self.settings.workers))]
    pub async fn run(&self, cancel: CancellationToken) -> Result<RefreshReport> {
        let sweep = self.sweep_expired();
        let result = self.refresh(cancel).await;

        if tokio::time::timeout(SWEEP_GRACE, sweep).await.is_err() {
            debug!("expired-entry sweep still running at exit");
        }
        result
    }

    async fn refresh(&self, cancel: CancellationToken) -> Result<RefreshReport> {
        let horizon = self.horizon_from(self.clock.now());
        let events = self.index.get_future_events(horizon).await?;
        if events.is_empty() {
            info!(horizon = %horizon, "no upcoming events to refresh");
            return Ok(RefreshReport::default());
        }
        info!(events = events.len(), horizon = %horizon, "refreshing upcoming events");

        let pipeline = Arc::clone(&self.pipeline);
        let pool = WorkerPool::new(self.settings.workers);
        let pool_report = pool
            .run(events, cancel, move |worker_id, event: Event| {
                let pipeline = Arc::clone(&pipeline);
                async move {
                    debug!(worker_id, event_id = %event.id, "worker picked up event");
                    match pipeline.enrich(&event.id, &event.location, event.starts_at).await {
                        Ok(_) => true,
                        Err(failure) => {
                            warn!(
                                worker_id,
                                event_id = %event.id,
                                stage = %failure.stage,
                                error = %failure.error,
                                "refresh failed for event"
                            );
                            false
                        }
                    }
                }
            })
            .await;

        let report = RefreshReport::from(pool_report);
        if report.cancelled {
            warn!(
                total = report.total,
                processed = report.processed,
                enriched = report.enriched,
                failed = report.failed,
                "refresh cancelled before completion"
            );
        } else {
            info!(
                total = report.total,
                processed = report.processed,
                enriched = report.enriched,
                failed = report.failed,
                "refresh complete"
            );
        }
        Ok(report)
    }

    fn horizon_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.settings.horizon).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
