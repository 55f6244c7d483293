//! Redis-backed stores
//!
//! Key layout:
//! - `geocoded_locations` hash: raw location string → JSON location, no expiry
//! - `event:<id>` string: JSON weather summary with a TTL
//! - `events:futureEvents` sorted set: event id scored by start epoch seconds
//! - `events` hash: event id → JSON event payload

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forecal_core::{Clock, FutureEventIndex, GeocodeStore, WeatherStore};
use forecal_domain::constants::{
    weather_key, EVENT_PAYLOADS_KEY, FUTURE_EVENTS_INDEX_KEY, GEOCODED_LOCATIONS_KEY,
};
use forecal_domain::{Event, GeocodedLocation, Result, WeatherError, WeatherSummary};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::errors::conversions::to_weather_error;

/// All store ports over one multiplexed redis connection.
///
/// The connection is not re-established if it drops; the resulting
/// `Connectivity` errors are fatal to the owning process.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    clock: Arc<dyn Clock>,
}

impl RedisStore {
    /// Connect and verify the server answers `PING`.
    #[instrument(level = "debug", skip(url, clock))]
    pub async fn connect(url: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|err| WeatherError::Config(format!("invalid redis URL: {err}")))?;
        let mut conn = client.get_multiplexed_async_connection().await.map_err(connect_error)?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await.map_err(connect_error)?;
        debug!("redis connection established");

        Ok(Self { conn, clock })
    }

    fn connection(&self) -> MultiplexedConnection {
        self.conn.clone()
    }
}

fn connect_error(err: RedisError) -> WeatherError {
    WeatherError::Connectivity(format!("redis unreachable: {err}"))
}

/// Write failures that are not connectivity problems surface as `StoreWrite`.
fn write_error(err: RedisError) -> WeatherError {
    match to_weather_error(err) {
        WeatherError::Store(message) => WeatherError::StoreWrite(message),
        other => other,
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|err| WeatherError::Internal(format!("failed to encode value: {err}")))
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|err| WeatherError::Store(format!("corrupt value under {key}: {err}")))
}

#[async_trait]
impl GeocodeStore for RedisStore {
    async fn get(&self, location: &str) -> Result<GeocodedLocation> {
        let raw: Option<String> = self
            .connection()
            .hget(GEOCODED_LOCATIONS_KEY, location)
            .await
            .map_err(to_weather_error)?;

        match raw {
            Some(raw) => decode(GEOCODED_LOCATIONS_KEY, &raw),
            None => Err(WeatherError::NotFound(format!("no geocoded location for {location}"))),
        }
    }

    async fn set(&self, location: &str, value: &GeocodedLocation) -> Result<()> {
        let raw = encode(value)?;
        let _: () = self
            .connection()
            .hset(GEOCODED_LOCATIONS_KEY, location, raw)
            .await
            .map_err(write_error)?;
        Ok(())
    }
}

#[async_trait]
impl WeatherStore for RedisStore {
    async fn get(&self, event_id: &str) -> Result<WeatherSummary> {
        let key = weather_key(event_id);
        let raw: Option<String> = self.connection().get(&key).await.map_err(to_weather_error)?;

        match raw {
            Some(raw) => decode(&key, &raw),
            None => Err(WeatherError::NotFound(format!("no weather for event {event_id}"))),
        }
    }

    async fn set(&self, event_id: &str, value: &WeatherSummary, ttl: Duration) -> Result<()> {
        let raw = encode(value)?;
        let _: () = self
            .connection()
            .set_ex(weather_key(event_id), raw, ttl.as_secs().max(1))
            .await
            .map_err(write_error)?;
        Ok(())
    }
}

#[async_trait]
impl FutureEventIndex for RedisStore {
    #[instrument(level = "debug", skip(self, event), fields(event_id = %event.id))]
    async fn store(&self, event: &Event) -> Result<()> {
        let raw = encode(event)?;
        let mut pipe = redis::pipe();
        pipe.atomic().hset(EVENT_PAYLOADS_KEY, &event.id, raw).ignore();

        if event.starts_after(self.clock.now()) {
            pipe.zadd(FUTURE_EVENTS_INDEX_KEY, &event.id, event.starts_at.timestamp()).ignore();
        } else {
            debug!("event already started, payload stored without indexing");
        }

        let mut conn = self.connection();
        let (): () = pipe.query_async(&mut conn).await.map_err(write_error)?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_future_events(&self, max: DateTime<Utc>) -> Result<Vec<Event>> {
        let mut conn = self.connection();
        let now = self.clock.now_epoch_seconds();

        let ids: Vec<String> = conn
            .zrangebyscore(FUTURE_EVENTS_INDEX_KEY, now, max.timestamp())
            .await
            .map_err(to_weather_error)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let payloads: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(EVENT_PAYLOADS_KEY)
            .arg(&ids)
            .query_async(&mut conn)
            .await
            .map_err(to_weather_error)?;

        let mut events = Vec::with_capacity(ids.len());
        for (id, payload) in ids.iter().zip(payloads) {
            let Some(raw) = payload else {
                warn!(event_id = %id, "indexed event has no stored payload, skipping");
                continue;
            };
            match decode::<Event>(EVENT_PAYLOADS_KEY, &raw) {
                Ok(event) => events.push(event),
                Err(err) => warn!(event_id = %id, error = %err, "skipping undecodable event payload"),
            }
        }
        Ok(events)
    }

    async fn remove_expired(&self) -> Result<u64> {
        let now = self.clock.now_epoch_seconds();
        let removed: u64 = self
            .connection()
            .zrembyscore(FUTURE_EVENTS_INDEX_KEY, "-inf", format!("({now}"))
            .await
            .map_err(write_error)?;
        Ok(removed)
    }
}
