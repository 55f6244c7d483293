//! In-process stores built on moka
//!
//! Same semantics as the redis backend for single-process runs and tests.
//! The geocode cache never expires; weather entries expire after the TTL
//! given on write.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forecal_core::{Clock, FutureEventIndex, GeocodeStore, WeatherStore};
use forecal_domain::{Event, GeocodedLocation, Result, WeatherError, WeatherSummary};
use moka::future::Cache;
use moka::Expiry;
use tracing::debug;

/// Default max capacity for each moka cache.
pub const DEFAULT_MEMORY_CACHE_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct TimedSummary {
    summary: WeatherSummary,
    ttl: Duration,
}

/// Per-entry expiry taken from the TTL stored with the value.
struct WriteTtl;

impl Expiry<String, TimedSummary> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &TimedSummary,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &TimedSummary,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Default)]
struct IndexState {
    payloads: HashMap<String, Event>,
    scores: HashMap<String, i64>,
    ordered: BTreeSet<(i64, String)>,
}

impl IndexState {
    fn upsert_score(&mut self, id: &str, score: i64) {
        if let Some(previous) = self.scores.insert(id.to_string(), score) {
            self.ordered.remove(&(previous, id.to_string()));
        }
        self.ordered.insert((score, id.to_string()));
    }
}

/// All store ports in process memory.
#[derive(Clone)]
pub struct MemoryStore {
    geocodes: Cache<String, GeocodedLocation>,
    weather: Cache<String, TimedSummary>,
    index: Arc<Mutex<IndexState>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CACHE_CAPACITY, clock)
    }

    pub fn with_capacity(max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            geocodes: Cache::builder().max_capacity(max_capacity).build(),
            weather: Cache::builder().max_capacity(max_capacity).expire_after(WriteTtl).build(),
            index: Arc::new(Mutex::new(IndexState::default())),
            clock,
        }
    }

    fn with_index<T>(&self, f: impl FnOnce(&mut IndexState) -> T) -> T {
        let mut state = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

#[async_trait]
impl GeocodeStore for MemoryStore {
    async fn get(&self, location: &str) -> Result<GeocodedLocation> {
        self.geocodes
            .get(location)
            .await
            .ok_or_else(|| WeatherError::NotFound(format!("no geocoded location for {location}")))
    }

    async fn set(&self, location: &str, value: &GeocodedLocation) -> Result<()> {
        self.geocodes.insert(location.to_string(), value.clone()).await;
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for MemoryStore {
    async fn get(&self, event_id: &str) -> Result<WeatherSummary> {
        self.weather
            .get(event_id)
            .await
            .map(|entry| entry.summary)
            .ok_or_else(|| WeatherError::NotFound(format!("no weather for event {event_id}")))
    }

    async fn set(&self, event_id: &str, value: &WeatherSummary, ttl: Duration) -> Result<()> {
        let entry = TimedSummary { summary: value.clone(), ttl: ttl.max(Duration::from_secs(1)) };
        self.weather.insert(event_id.to_string(), entry).await;
        Ok(())
    }
}

#[async_trait]
impl FutureEventIndex for MemoryStore {
    async fn store(&self, event: &Event) -> Result<()> {
        let is_future = event.starts_after(self.clock.now());
        self.with_index(|state| {
            state.payloads.insert(event.id.clone(), event.clone());
            if is_future {
                state.upsert_score(&event.id, event.starts_at.timestamp());
            }
        });
        Ok(())
    }

    async fn get_future_events(&self, max: DateTime<Utc>) -> Result<Vec<Event>> {
        let now = self.clock.now_epoch_seconds();
        let max = max.timestamp();
        if max < now {
            return Ok(Vec::new());
        }

        Ok(self.with_index(|state| {
            state
                .ordered
                .range((now, String::new())..)
                .take_while(|(score, _)| *score <= max)
                .filter_map(|(_, id)| state.payloads.get(id).cloned())
                .collect()
        }))
    }

    async fn remove_expired(&self) -> Result<u64> {
        let now = self.clock.now_epoch_seconds();
        let removed = self.with_index(|state| {
            let keep = state.ordered.split_off(&(now, String::new()));
            let expired = std::mem::replace(&mut state.ordered, keep);
            for (_, id) in &expired {
                state.scores.remove(id);
            }
            expired.len() as u64
        });
        debug!(removed, "expired index entries purged");
        Ok(removed)
    }
}
