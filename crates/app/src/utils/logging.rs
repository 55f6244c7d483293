//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,forecal_core=info,forecal_infra=info,lapin=warn";

/// Environment variable selecting the output format (`json` or `pretty`).
pub const LOG_FORMAT_VAR: &str = "FORECAL_LOG_FORMAT";

/// Install the global subscriber. Safe to call more than once; only the
/// first call takes effect.
pub fn init() {
    let json = std::env::var(LOG_FORMAT_VAR).is_ok_and(|format| wants_json(&format));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let result = if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).with_target(true).try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn wants_json(format: &str) -> bool {
    format.trim().eq_ignore_ascii_case("json")
}
