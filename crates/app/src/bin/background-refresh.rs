//! Re-enriches every indexed event starting within the refresh horizon.

use anyhow::Context;
use clap::Parser;
use forecal_app::utils::{logging, shutdown};
use forecal_app::AppContext;
use forecal_core::RefreshSettings;
use forecal_domain::RefreshConfig;
use forecal_infra::config;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "background-refresh", about = "Refresh cached weather for upcoming events")]
struct Args {
    /// Refresh events starting within this many minutes [default: 1440]
    #[arg(long)]
    minutes: Option<u64>,

    /// Number of concurrent workers [default: 3]
    #[arg(long)]
    workers: Option<usize>,
}

impl Args {
    fn apply(&self, refresh: &mut RefreshConfig) {
        if let Some(minutes) = self.minutes {
            refresh.horizon_minutes = minutes;
        }
        if let Some(workers) = self.workers {
            refresh.workers = workers;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
    logging::init();

    let mut config = config::load().context("failed to load configuration")?;
    args.apply(&mut config.refresh);

    let context = AppContext::new(config).await.context("failed to connect to the store")?;
    let coordinator =
        context.refresh_coordinator(RefreshSettings::from_config(&context.config.refresh))?;

    let report = coordinator.run(shutdown::cancel_on_ctrl_c()).await?;
    let report = serde_json::to_string(&report)?;
    info!(%report, "background refresh finished");
    Ok(())
}
