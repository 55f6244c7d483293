//! # Forecal Core
//!
//! Enrichment logic with no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for caches, the weather provider and the broker
//! - The geocoding, forecast selection and enrichment services
//! - The batch refresh coordinator and its worker pool
//!
//! ## Architecture Principles
//! - Only depends on `forecal-domain`
//! - No redis, HTTP or AMQP code
//! - All external dependencies via `Arc<dyn Port>`

pub mod clock;
pub mod enrichment;
pub mod forecast;
pub mod geocoding;
pub mod publishing;
pub mod refresh;

pub use clock::{Clock, MockClock, SystemClock};
pub use enrichment::ports::WeatherStore;
pub use enrichment::{
    Enrichment, EnrichmentFailure, EnrichmentHandler, EnrichmentOutcome, EnrichmentPipeline,
    EnrichmentStage,
};
pub use forecast::ports::ForecastProvider;
pub use forecast::{select_bucket, ForecastBucket, ForecastSelector};
pub use geocoding::ports::{GeocodeStore, GeocodingProvider};
pub use geocoding::GeocodeService;
pub use publishing::ports::EventPublisher;
pub use publishing::EventChangePublisher;
pub use refresh::ports::FutureEventIndex;
pub use refresh::{BatchRefreshCoordinator, PoolReport, RefreshReport, RefreshSettings, WorkerPool};
