//! # Forecal Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Redis and in-memory stores (geocode cache, weather cache, future events index)
//! - The OpenWeather HTTP client (geocoding and forecasts)
//! - AMQP topology, consumer and publisher
//! - Configuration loading and error conversions
//!
//! ## Architecture
//! - Implements traits defined in `forecal-core`
//! - Contains all "impure" code (network and process environment)

pub mod broker;
pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod store;

// Re-export commonly used items
pub use broker::{AmqpEventPublisher, BrokerConnection, ConsumerStats, EnrichmentConsumer};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::openweather::OpenWeatherClient;
pub use store::{MemoryStore, RedisStore};
