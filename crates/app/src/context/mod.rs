//! Application context - dependency wiring
//!
//! Stores are built once per process from [`Config::store`]; services are
//! assembled on demand by the binary that needs them.

use std::sync::Arc;
use std::time::Duration;

use forecal_core::{
    BatchRefreshCoordinator, Clock, EnrichmentHandler, EnrichmentPipeline, EventChangePublisher,
    EventPublisher, ForecastSelector, FutureEventIndex, GeocodeService, GeocodeStore,
    RefreshSettings, SystemClock, WeatherStore,
};
use forecal_domain::{Config, Result, StoreBackend};
use forecal_infra::{AmqpEventPublisher, BrokerConnection, MemoryStore, OpenWeatherClient, RedisStore};
use tracing::info;

/// Holds configuration, the clock and the store handles.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub geocode_store: Arc<dyn GeocodeStore>,
    pub weather_store: Arc<dyn WeatherStore>,
    pub index: Arc<dyn FutureEventIndex>,
}

impl AppContext {
    /// Build a context on the system clock.
    ///
    /// # Errors
    /// Returns `WeatherError::Connectivity` when the redis backend is
    /// selected and unreachable.
    pub async fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        match config.store.backend {
            StoreBackend::Redis => {
                let store = Arc::new(RedisStore::connect(&config.store.redis_url, clock.clone()).await?);
                info!(backend = "redis", "store connected");
                Ok(Self {
                    geocode_store: store.clone(),
                    weather_store: store.clone(),
                    index: store,
                    config,
                    clock,
                })
            }
            StoreBackend::Memory => {
                let store = Arc::new(MemoryStore::new(clock.clone()));
                info!(backend = "memory", "using in-process store");
                Ok(Self {
                    geocode_store: store.clone(),
                    weather_store: store.clone(),
                    index: store,
                    config,
                    clock,
                })
            }
        }
    }

    /// Geocode, forecast and cache pipeline against the configured provider.
    ///
    /// # Errors
    /// Returns `WeatherError::Config` for a missing API key or bad base URL.
    pub fn pipeline(&self) -> Result<Arc<EnrichmentPipeline>> {
        let provider = Arc::new(OpenWeatherClient::from_config(&self.config.provider)?);

        Ok(Arc::new(EnrichmentPipeline::new(
            GeocodeService::new(self.geocode_store.clone(), provider.clone()),
            ForecastSelector::new(provider, self.clock.clone()),
            self.weather_store.clone(),
            self.weather_ttl(),
        )))
    }

    pub fn enrichment_handler(&self) -> Result<EnrichmentHandler> {
        Ok(EnrichmentHandler::new(self.pipeline()?, self.clock.clone()))
    }

    pub fn refresh_coordinator(&self, settings: RefreshSettings) -> Result<BatchRefreshCoordinator> {
        Ok(BatchRefreshCoordinator::new(
            self.index.clone(),
            self.pipeline()?,
            self.clock.clone(),
            settings,
        ))
    }

    /// Index-then-publish entry point for newly persisted events.
    pub fn change_publisher(&self, publisher: Arc<dyn EventPublisher>) -> EventChangePublisher {
        EventChangePublisher::new(publisher, self.index.clone())
    }

    /// [`Self::change_publisher`] over a confirm-mode AMQP channel.
    pub async fn amqp_change_publisher(
        &self,
        broker: &BrokerConnection,
    ) -> Result<EventChangePublisher> {
        let publisher = AmqpEventPublisher::new(broker, self.clock.clone()).await?;
        Ok(self.change_publisher(Arc::new(publisher)))
    }

    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache.weather_ttl_seconds)
    }
}
