//! In-memory doubles for the core ports
//!
//! Each double records its calls and can be switched into a failing mode.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forecal_core::{
    Clock, EventPublisher, ForecastProvider, FutureEventIndex, GeocodeStore, GeocodingProvider,
    MockClock, WeatherStore,
};
use forecal_domain::{
    DailyForecast, Event, EventCreated, GeocodedLocation, HourlyForecast, Result, WeatherError,
    WeatherSummary,
};

/// Geocode cache double. Reads and writes can be made to fail.
#[derive(Default)]
pub struct MockGeocodeStore {
    entries: Mutex<HashMap<String, GeocodedLocation>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl MockGeocodeStore {
    pub fn with_entry(self, location: &str, value: GeocodedLocation) -> Self {
        self.entries.lock().unwrap().insert(location.to_string(), value);
        self
    }

    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn entry(&self, location: &str) -> Option<GeocodedLocation> {
        self.entries.lock().unwrap().get(location).cloned()
    }
}

#[async_trait]
impl GeocodeStore for MockGeocodeStore {
    async fn get(&self, location: &str) -> Result<GeocodedLocation> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(WeatherError::Store("geocode store unavailable".into()));
        }
        self.entries
            .lock()
            .unwrap()
            .get(location)
            .cloned()
            .ok_or_else(|| WeatherError::NotFound(location.to_string()))
    }

    async fn set(&self, location: &str, value: &GeocodedLocation) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WeatherError::StoreWrite("geocode store read-only".into()));
        }
        self.entries.lock().unwrap().insert(location.to_string(), value.clone());
        Ok(())
    }
}

/// Geocoding provider double returning canned candidates per location.
#[derive(Default)]
pub struct MockGeocodingProvider {
    candidates: Mutex<HashMap<String, Vec<GeocodedLocation>>>,
    failure: Mutex<Option<WeatherError>>,
    calls: Mutex<Vec<String>>,
}

impl MockGeocodingProvider {
    pub fn with_candidates(self, location: &str, candidates: Vec<GeocodedLocation>) -> Self {
        self.candidates.lock().unwrap().insert(location.to_string(), candidates);
        self
    }

    pub fn failing_with(self, error: WeatherError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GeocodingProvider for MockGeocodingProvider {
    async fn geocode(&self, location: &str) -> Result<Vec<GeocodedLocation>> {
        self.calls.lock().unwrap().push(location.to_string());
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.candidates.lock().unwrap().get(location).cloned().unwrap_or_default())
    }
}

/// Forecast provider double serving fixed hourly and daily sequences.
#[derive(Default)]
pub struct MockForecastProvider {
    hourly: Mutex<Vec<HourlyForecast>>,
    daily: Mutex<Vec<DailyForecast>>,
    failure: Mutex<Option<WeatherError>>,
    pub hourly_calls: AtomicUsize,
    pub daily_calls: AtomicUsize,
}

impl MockForecastProvider {
    pub fn with_hourly(self, points: Vec<HourlyForecast>) -> Self {
        *self.hourly.lock().unwrap() = points;
        self
    }

    pub fn with_daily(self, points: Vec<DailyForecast>) -> Self {
        *self.daily.lock().unwrap() = points;
        self
    }

    pub fn failing_with(self, error: WeatherError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn total_calls(&self) -> usize {
        self.hourly_calls.load(Ordering::SeqCst) + self.daily_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastProvider for MockForecastProvider {
    async fn hourly_forecast(&self, _location: &GeocodedLocation) -> Result<Vec<HourlyForecast>> {
        self.hourly_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.hourly.lock().unwrap().clone())
    }

    async fn daily_forecast(&self, _location: &GeocodedLocation) -> Result<Vec<DailyForecast>> {
        self.daily_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.daily.lock().unwrap().clone())
    }
}

/// Weather cache double recording every write with its TTL.
#[derive(Default)]
pub struct MockWeatherStore {
    entries: Mutex<HashMap<String, (WeatherSummary, Duration)>>,
    writes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl MockWeatherStore {
    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub fn entry(&self, event_id: &str) -> Option<(WeatherSummary, Duration)> {
        self.entries.lock().unwrap().get(event_id).cloned()
    }

    /// Event ids in write order, including failed writes.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherStore for MockWeatherStore {
    async fn get(&self, event_id: &str) -> Result<WeatherSummary> {
        self.entries
            .lock()
            .unwrap()
            .get(event_id)
            .map(|(summary, _)| summary.clone())
            .ok_or_else(|| WeatherError::NotFound(event_id.to_string()))
    }

    async fn set(&self, event_id: &str, value: &WeatherSummary, ttl: Duration) -> Result<()> {
        self.writes.lock().unwrap().push(event_id.to_string());
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WeatherError::StoreWrite("weather store read-only".into()));
        }
        self.entries.lock().unwrap().insert(event_id.to_string(), (value.clone(), ttl));
        Ok(())
    }
}

/// Future index double with the same `[now, max]` semantics as the real
/// stores, driven by a shared [`MockClock`].
pub struct MockFutureEventIndex {
    clock: MockClock,
    payloads: Mutex<HashMap<String, Event>>,
    scores: Mutex<HashMap<String, i64>>,
    fail_queries: AtomicBool,
    fail_stores: AtomicBool,
    pub sweeps: AtomicUsize,
}

impl MockFutureEventIndex {
    pub fn new(clock: MockClock) -> Self {
        Self {
            clock,
            payloads: Mutex::default(),
            scores: Mutex::default(),
            fail_queries: AtomicBool::new(false),
            fail_stores: AtomicBool::new(false),
            sweeps: AtomicUsize::new(0),
        }
    }

    pub fn failing_queries(self) -> Self {
        self.fail_queries.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_stores(self) -> Self {
        self.fail_stores.store(true, Ordering::SeqCst);
        self
    }

    pub fn is_indexed(&self, event_id: &str) -> bool {
        self.scores.lock().unwrap().contains_key(event_id)
    }

    pub fn has_payload(&self, event_id: &str) -> bool {
        self.payloads.lock().unwrap().contains_key(event_id)
    }
}

#[async_trait]
impl FutureEventIndex for MockFutureEventIndex {
    async fn store(&self, event: &Event) -> Result<()> {
        if self.fail_stores.load(Ordering::SeqCst) {
            return Err(WeatherError::StoreWrite("index unavailable".into()));
        }
        self.payloads.lock().unwrap().insert(event.id.clone(), event.clone());
        if event.starts_after(self.clock.now()) {
            self.scores.lock().unwrap().insert(event.id.clone(), event.starts_at.timestamp());
        }
        Ok(())
    }

    async fn get_future_events(&self, max: DateTime<Utc>) -> Result<Vec<Event>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(WeatherError::Connectivity("index unreachable".into()));
        }
        let now = self.clock.now_epoch_seconds();
        let max = max.timestamp();
        let mut hits: Vec<(i64, String)> = self
            .scores
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, score)| (now..=max).contains(*score))
            .map(|(id, score)| (*score, id.clone()))
            .collect();
        hits.sort();

        let payloads = self.payloads.lock().unwrap();
        Ok(hits.into_iter().filter_map(|(_, id)| payloads.get(&id).cloned()).collect())
    }

    async fn remove_expired(&self) -> Result<u64> {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now_epoch_seconds();
        let mut scores = self.scores.lock().unwrap();
        let before = scores.len();
        scores.retain(|_, score| *score >= now);
        Ok((before - scores.len()) as u64)
    }
}

/// Broker publisher double.
#[derive(Default)]
pub struct MockEventPublisher {
    published: Mutex<Vec<EventCreated>>,
    fail: AtomicBool,
}

impl MockEventPublisher {
    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn published(&self) -> Vec<EventCreated> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish_event_created(&self, message: &EventCreated) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(WeatherError::Connectivity("broker connection closed".into()));
        }
        self.published.lock().unwrap().push(message.clone());
        Ok(())
    }
}
