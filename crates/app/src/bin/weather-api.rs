//! Serves cached event weather over HTTP.

use anyhow::Context;
use forecal_app::utils::{logging, shutdown};
use forecal_app::{router, AppContext};
use forecal_infra::config;
use tokio::net::TcpListener;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
    logging::init();

    let config = config::load().context("failed to load configuration")?;
    let context = AppContext::new(config).await.context("failed to connect to the store")?;

    let listener = TcpListener::bind(&context.config.api.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", context.config.api.bind_addr))?;
    info!(addr = %context.config.api.bind_addr, "weather api listening");

    let cancel = shutdown::cancel_on_ctrl_c();
    axum::serve(listener, router(context.weather_store.clone()))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("weather api stopped");
    Ok(())
}
