//! Consumes `event.created` messages and caches each event's weather.

use anyhow::Context;
use forecal_app::utils::{logging, shutdown};
use forecal_app::AppContext;
use forecal_infra::{config, BrokerConnection, EnrichmentConsumer};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
    logging::init();

    let config = config::load().context("failed to load configuration")?;
    let context = AppContext::new(config).await.context("failed to connect to the store")?;
    let handler = context.enrichment_handler()?;

    let broker = BrokerConnection::connect(&context.config.broker)
        .await
        .context("failed to connect to the broker")?;
    broker.declare_consumer_queue().await?;

    let consumer = EnrichmentConsumer::new(&broker, handler);
    let cancel = shutdown::cancel_on_ctrl_c();

    info!(queue = %context.config.broker.queue, "enrichment worker started");
    let result = consumer.run(cancel).await;
    broker.close().await;

    match result {
        Ok(stats) => {
            info!(
                received = stats.received,
                enriched = stats.enriched,
                skipped = stats.skipped,
                failed = stats.failed,
                undecodable = stats.undecodable,
                "enrichment worker stopped"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "enrichment worker terminated");
            Err(err.into())
        }
    }
}
