//! Application constants
//!
//! Centralized location for the broker topology, store key layout and
//! forecast windows shared by every process.

// Broker topology
pub const EXCHANGE_NAME: &str = "calendar";
pub const EVENT_CREATED_ROUTING_KEY: &str = "event.created";
pub const ENRICHMENT_QUEUE_NAME: &str = "enrich_event_with_weather";
pub const CONSUMER_PREFETCH: u16 = 1;
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Store key layout
pub const GEOCODED_LOCATIONS_KEY: &str = "geocoded_locations";
pub const WEATHER_KEY_PREFIX: &str = "event:";
pub const FUTURE_EVENTS_INDEX_KEY: &str = "events:futureEvents";
pub const EVENT_PAYLOADS_KEY: &str = "events";
pub const DEFAULT_WEATHER_TTL_SECS: u64 = 3600;

// Forecast windows (hours of lead time)
pub const HOURLY_FORECAST_WINDOW_HOURS: i64 = 48;
pub const DAILY_FORECAST_WINDOW_HOURS: i64 = 168;
pub const DAILY_FORECAST_POINT_HOUR: u32 = 12;

// Daily temperature bands (local hour upper bounds, exclusive)
pub const MORNING_BEFORE_HOUR: u32 = 10;
pub const DAY_BEFORE_HOUR: u32 = 17;
pub const EVENING_BEFORE_HOUR: u32 = 20;

// Batch refresh defaults
pub const DEFAULT_REFRESH_HORIZON_MINUTES: u64 = 1440;
pub const DEFAULT_REFRESH_WORKERS: usize = 3;

// Provider defaults
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
pub const GEOCODE_CANDIDATE_LIMIT: u32 = 1;

/// Weather cache key for an event id.
pub fn weather_key(event_id: &str) -> String {
    format!("{WEATHER_KEY_PREFIX}{event_id}")
}
