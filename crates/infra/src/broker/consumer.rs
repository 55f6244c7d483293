//! Streaming consumer for `event.created` deliveries
//!
//! Deliveries are processed one at a time and acknowledged after the
//! handler returns, whether or not enrichment succeeded. Cancellation is
//! only observed between deliveries so an in-flight event always finishes.

use std::fmt::Display;
use std::pin::pin;

use async_trait::async_trait;
use forecal_core::{EnrichmentHandler, EnrichmentOutcome};
use forecal_domain::{Result, WeatherError};
use futures::{Stream, StreamExt};
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicCancelOptions, BasicConsumeOptions};
use lapin::types::FieldTable;
use lapin::Channel;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::topology::BrokerConnection;
use crate::errors::conversions::to_weather_error;

/// A message body that can be acknowledged back to the broker.
#[async_trait]
pub trait InboundDelivery: Send {
    fn body(&self) -> &[u8];
    async fn ack(&self) -> Result<()>;
}

#[async_trait]
impl InboundDelivery for Delivery {
    fn body(&self) -> &[u8] {
        &self.data
    }

    async fn ack(&self) -> Result<()> {
        self.acker.ack(BasicAckOptions::default()).await.map_err(to_weather_error)
    }
}

/// Per-run delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerStats {
    pub received: u64,
    pub enriched: u64,
    pub skipped: u64,
    pub failed: u64,
    pub undecodable: u64,
}

impl ConsumerStats {
    fn record(&mut self, outcome: &EnrichmentOutcome) {
        self.received += 1;
        match outcome {
            EnrichmentOutcome::Enriched { .. } => self.enriched += 1,
            EnrichmentOutcome::SkippedPast { .. } => self.skipped += 1,
            EnrichmentOutcome::Failed { .. } => self.failed += 1,
            EnrichmentOutcome::Undecodable(_) => self.undecodable += 1,
        }
    }
}

/// Consumes the enrichment queue until cancelled or the connection drops.
pub struct EnrichmentConsumer {
    channel: Channel,
    queue: String,
    consumer_tag: String,
    handler: EnrichmentHandler,
}

impl EnrichmentConsumer {
    /// Build a consumer on an already declared queue.
    pub fn new(broker: &BrokerConnection, handler: EnrichmentHandler) -> Self {
        Self {
            channel: broker.channel().clone(),
            queue: broker.config().queue.clone(),
            consumer_tag: format!("forecal-enrichment-{}", uuid::Uuid::new_v4()),
            handler,
        }
    }

    /// Consume until `cancel` fires.
    ///
    /// Returns `Ok` with the run's counters on cancellation and a
    /// `Connectivity` error if the delivery stream ends or fails.
    #[instrument(skip(self, cancel), fields(queue = %self.queue, consumer_tag = %self.consumer_tag))]
    pub async fn run(&self, cancel: CancellationToken) -> Result<ConsumerStats> {
        let deliveries = self
            .channel
            .basic_consume(
                &self.queue,
                &self.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(to_weather_error)?;

        info!("consuming event.created deliveries");
        let result = consume(deliveries, &self.handler, &cancel).await;

        if cancel.is_cancelled() {
            if let Err(err) =
                self.channel.basic_cancel(&self.consumer_tag, BasicCancelOptions::default()).await
            {
                warn!(error = %err, "failed to cancel consumer");
            }
        }

        result
    }
}

/// Drive a delivery stream through the handler.
pub async fn consume<S, D, E>(
    deliveries: S,
    handler: &EnrichmentHandler,
    cancel: &CancellationToken,
) -> Result<ConsumerStats>
where
    S: Stream<Item = std::result::Result<D, E>>,
    D: InboundDelivery,
    E: Display,
{
    let mut deliveries = pin!(deliveries);
    let mut stats = ConsumerStats::default();

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(received = stats.received, enriched = stats.enriched, "consumer stopped");
                return Ok(stats);
            }
            next = deliveries.next() => next,
        };

        let delivery = match next {
            Some(Ok(delivery)) => delivery,
            Some(Err(err)) => {
                return Err(WeatherError::Connectivity(format!("delivery stream failed: {err}")));
            }
            None => {
                return Err(WeatherError::Connectivity("delivery stream closed".to_string()));
            }
        };

        let outcome = handler.handle_delivery(delivery.body()).await;
        debug!(stage = %outcome.last_stage(), "delivery handled");
        stats.record(&outcome);
        delivery.ack().await?;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use forecal_core::{EnrichmentPipeline, ForecastSelector, GeocodeService, MockClock};

    use super::*;
    use crate::http::HttpClient;
    use crate::integrations::openweather::OpenWeatherClient;
    use crate::store::MemoryStore;

    struct FakeDelivery {
        body: Vec<u8>,
        acks: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InboundDelivery for FakeDelivery {
        fn body(&self) -> &[u8] {
            &self.body
        }

        async fn ack(&self) -> Result<()> {
            self.acks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // Only paths that never reach the provider are exercised here.
    fn offline_handler() -> EnrichmentHandler {
        let clock = Arc::new(MockClock::at(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        let store = Arc::new(MemoryStore::new(clock.clone()));
        let provider = Arc::new(
            OpenWeatherClient::new("test-key", HttpClient::new().unwrap())
                .with_base_url("http://127.0.0.1:9"),
        );
        let pipeline = EnrichmentPipeline::new(
            GeocodeService::new(store.clone(), provider.clone()),
            ForecastSelector::new(provider, clock.clone()),
            store,
            Duration::from_secs(3600),
        );
        EnrichmentHandler::new(Arc::new(pipeline), clock)
    }

    fn delivery(body: &str, acks: &Arc<AtomicUsize>) -> std::result::Result<FakeDelivery, String> {
        Ok(FakeDelivery { body: body.as_bytes().to_vec(), acks: acks.clone() })
    }

    #[tokio::test]
    async fn acks_every_delivery_and_fails_when_stream_closes() {
        let acks = Arc::new(AtomicUsize::new(0));
        let stream = futures::stream::iter(vec![
            delivery("not json", &acks),
            delivery(
                r#"{"id":"evt-1","location":"London","startsAt":"2024-06-01T09:00:00+00:00"}"#,
                &acks,
            ),
        ]);

        let err = consume(stream, &offline_handler(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Connectivity(_)));
        assert!(err.is_fatal());
        assert_eq!(acks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stream_error_is_a_connectivity_failure() {
        let acks = Arc::new(AtomicUsize::new(0));
        let stream = futures::stream::iter(vec![
            delivery("{}", &acks),
            Err("connection reset".to_string()),
        ]);

        let err = consume(stream, &offline_handler(), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            WeatherError::Connectivity(message) => assert!(message.contains("connection reset")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(acks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_returns_counters() {
        let acks = Arc::new(AtomicUsize::new(0));
        let stream = futures::stream::iter(vec![delivery("[]", &acks)])
            .chain(futures::stream::pending());
        let cancel = CancellationToken::new();
        let handler = offline_handler();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move { consume(stream, &handler, &cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let stats = task.await.unwrap().unwrap();
        assert_eq!(
            stats,
            ConsumerStats { received: 1, undecodable: 1, ..ConsumerStats::default() }
        );
        assert_eq!(acks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stats_count_each_outcome() {
        let mut stats = ConsumerStats::default();
        stats.record(&EnrichmentOutcome::SkippedPast { event_id: "a".into() });
        stats.record(&EnrichmentOutcome::Undecodable(WeatherError::InvalidInput("x".into())));
        assert_eq!(stats.received, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.undecodable, 1);
        assert_eq!(stats.enriched, 0);
    }
}
