//! Per-delivery state machine of the enrichment consumer.

mod support;

use std::sync::atomic::Ordering;

use forecal_core::{EnrichmentOutcome, EnrichmentStage};
use forecal_domain::{EventCreated, WeatherError};
use support::doubles::{MockForecastProvider, MockGeocodingProvider, MockWeatherStore};
use support::fixtures::{at_offset, daily_point, hourly_point, utc, Harness, WEATHER_TTL};

fn message(id: &str, location: &str, starts_at: chrono::DateTime<chrono::FixedOffset>) -> Vec<u8> {
    serde_json::to_vec(&EventCreated { id: id.into(), location: location.into(), starts_at })
        .unwrap()
}

fn hourly_harness() -> Harness {
    Harness::new(
        utc(2024, 1, 1, 0, 0),
        MockForecastProvider::default()
            .with_hourly(vec![hourly_point(utc(2024, 1, 1, 10, 0), 7.5, "Rain")]),
    )
}

#[tokio::test]
async fn future_event_is_enriched_and_cached_with_ttl() {
    let harness = hourly_harness();

    let outcome = harness
        .handler()
        .handle_delivery(&message("evt-1", "London", at_offset(0, 2024, 1, 1, 10, 0)))
        .await;

    assert!(outcome.is_enriched());
    assert_eq!(outcome.last_stage(), EnrichmentStage::Cached);
    let (summary, ttl) = harness.weather.entry("evt-1").unwrap();
    assert_eq!(summary.kind, "Rain");
    assert_eq!(summary.temperature, 7.5);
    assert_eq!(ttl, WEATHER_TTL);
}

#[tokio::test]
async fn past_event_does_no_lookups_or_writes() {
    let harness = hourly_harness();
    harness.clock.set(utc(2024, 1, 1, 10, 0));

    let outcome = harness
        .handler()
        .handle_delivery(&message("evt-1", "London", at_offset(0, 2024, 1, 1, 10, 0)))
        .await;

    assert_eq!(outcome, EnrichmentOutcome::SkippedPast { event_id: "evt-1".into() });
    assert_eq!(harness.geocoder.call_count(), 0);
    assert_eq!(harness.geocode_store.reads.load(Ordering::SeqCst), 0);
    assert_eq!(harness.forecasts.total_calls(), 0);
    assert!(harness.weather.writes().is_empty());
}

#[tokio::test]
async fn undecodable_body_is_reported_and_nothing_else_happens() {
    let harness = hourly_harness();

    let outcome = harness.handler().handle_delivery(b"{not json").await;

    assert!(matches!(outcome, EnrichmentOutcome::Undecodable(WeatherError::InvalidInput(_))));
    assert_eq!(outcome.last_stage(), EnrichmentStage::Received);
    assert_eq!(harness.geocoder.call_count(), 0);
    assert!(harness.weather.writes().is_empty());
}

#[tokio::test]
async fn too_far_in_future_is_dropped_without_write() {
    let harness = hourly_harness();

    let outcome = harness
        .handler()
        .handle_delivery(&message("evt-9", "London", at_offset(0, 2024, 1, 20, 10, 0)))
        .await;

    match outcome {
        EnrichmentOutcome::Failed { event_id, failure } => {
            assert_eq!(event_id, "evt-9");
            assert_eq!(failure.stage, EnrichmentStage::ForecastLookup);
            assert_eq!(failure.error.label(), "too_far_in_future");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(harness.forecasts.total_calls(), 0);
    assert!(harness.weather.writes().is_empty());
}

#[tokio::test]
async fn unknown_location_fails_at_geocoding() {
    let harness = hourly_harness().with_geocoder(MockGeocodingProvider::default());

    let outcome = harness
        .handler()
        .handle_delivery(&message("evt-2", "Nowhere", at_offset(0, 2024, 1, 1, 10, 0)))
        .await;

    assert_eq!(outcome.last_stage(), EnrichmentStage::Geocoding);
    assert_eq!(harness.forecasts.total_calls(), 0);
    assert!(harness.weather.writes().is_empty());
}

#[tokio::test]
async fn weather_write_failure_still_counts_as_enriched() {
    let harness = hourly_harness().with_weather_store(MockWeatherStore::default().failing_writes());

    let outcome = harness
        .handler()
        .handle_delivery(&message("evt-3", "London", at_offset(0, 2024, 1, 1, 10, 0)))
        .await;

    match outcome {
        EnrichmentOutcome::Enriched { cached, .. } => assert!(!cached),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(harness.weather.writes(), vec!["evt-3".to_string()]);
}

#[tokio::test]
async fn daily_window_event_uses_daily_sequence() {
    let harness = Harness::new(
        utc(2024, 1, 1, 0, 0),
        MockForecastProvider::default()
            .with_daily(vec![daily_point(at_offset(0, 2024, 1, 4, 12, 0), "Clouds")]),
    );

    let outcome = harness
        .handler()
        .handle_delivery(&message("evt-4", "London", at_offset(0, 2024, 1, 4, 9, 0)))
        .await;

    assert!(outcome.is_enriched());
    let (summary, _) = harness.weather.entry("evt-4").unwrap();
    assert_eq!(summary.kind, "Clouds");
    assert_eq!(summary.temperature, 1.0);
}
