//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Start from the first config file found in the standard locations, or
//!    from [`Config::default`] when there is none
//! 2. Apply every `FORECAL_*` environment variable that is set on top
//! 3. A file or variable that does not parse is an error, never skipped
//!
//! ## Environment Variables
//! All optional; unset or blank variables keep the file or default value.
//! - `FORECAL_BROKER_URL`, `FORECAL_BROKER_EXCHANGE`,
//!   `FORECAL_BROKER_ROUTING_KEY`, `FORECAL_BROKER_QUEUE`,
//!   `FORECAL_BROKER_PREFETCH`
//! - `FORECAL_STORE_BACKEND` (`redis` or `memory`), `FORECAL_REDIS_URL`
//! - `FORECAL_PROVIDER_API_KEY` (checked when the provider client is built),
//!   `FORECAL_PROVIDER_BASE_URL`, `FORECAL_PROVIDER_TIMEOUT_SECONDS`
//! - `FORECAL_WEATHER_TTL_SECONDS`
//! - `FORECAL_REFRESH_MINUTES`, `FORECAL_REFRESH_WORKERS`
//! - `FORECAL_API_BIND_ADDR`
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `forecal.{json,toml}` in the
//! current directory, up to two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use forecal_domain::{Config, Result, StoreBackend, WeatherError};

/// Load configuration: probed file (if any) overlaid with the environment.
///
/// # Errors
/// Returns `WeatherError::Config` if the file or an environment variable
/// does not parse.
pub fn load() -> Result<Config> {
    load_layered(probe_config_paths())
}

fn load_layered(file: Option<PathBuf>) -> Result<Config> {
    let base = match file {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };

    let config = apply_env(base)?;
    tracing::info!(backend = %config.store.backend, "Configuration loaded");
    Ok(config)
}

/// Load configuration from environment variables over the defaults.
///
/// # Errors
/// Returns `WeatherError::Config` if a value does not parse.
pub fn load_from_env() -> Result<Config> {
    apply_env(Config::default())
}

fn apply_env(mut config: Config) -> Result<Config> {
    if let Some(url) = env_opt("FORECAL_BROKER_URL") {
        config.broker.url = url;
    }
    if let Some(exchange) = env_opt("FORECAL_BROKER_EXCHANGE") {
        config.broker.exchange = exchange;
    }
    if let Some(routing_key) = env_opt("FORECAL_BROKER_ROUTING_KEY") {
        config.broker.routing_key = routing_key;
    }
    if let Some(queue) = env_opt("FORECAL_BROKER_QUEUE") {
        config.broker.queue = queue;
    }
    if let Some(prefetch) = env_parse::<u16>("FORECAL_BROKER_PREFETCH")? {
        config.broker.prefetch = prefetch;
    }

    if let Some(backend) = env_opt("FORECAL_STORE_BACKEND") {
        config.store.backend = backend.parse::<StoreBackend>().map_err(WeatherError::Config)?;
    }
    if let Some(redis_url) = env_opt("FORECAL_REDIS_URL") {
        config.store.redis_url = redis_url;
    }

    if let Some(api_key) = env_opt("FORECAL_PROVIDER_API_KEY") {
        config.provider.api_key = api_key;
    }
    if let Some(base_url) = env_opt("FORECAL_PROVIDER_BASE_URL") {
        config.provider.base_url = base_url;
    }
    if let Some(timeout) = env_parse::<u64>("FORECAL_PROVIDER_TIMEOUT_SECONDS")? {
        config.provider.timeout_seconds = timeout;
    }

    if let Some(ttl) = env_parse::<u64>("FORECAL_WEATHER_TTL_SECONDS")? {
        config.cache.weather_ttl_seconds = ttl;
    }

    if let Some(minutes) = env_parse::<u64>("FORECAL_REFRESH_MINUTES")? {
        config.refresh.horizon_minutes = minutes;
    }
    if let Some(workers) = env_parse::<usize>("FORECAL_REFRESH_WORKERS")? {
        config.refresh.workers = workers;
    }

    if let Some(bind_addr) = env_opt("FORECAL_API_BIND_ADDR") {
        config.api.bind_addr = bind_addr;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `WeatherError::Config` if no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(WeatherError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            WeatherError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| WeatherError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| WeatherError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WeatherError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(WeatherError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots.iter().flat_map(|root| candidates(root)).find(|path| path.exists())
}

fn candidates(root: &Path) -> Vec<PathBuf> {
    vec![
        root.join("config.json"),
        root.join("config.toml"),
        root.join("forecal.json"),
        root.join("forecal.toml"),
        root.join("../config.json"),
        root.join("../config.toml"),
        root.join("../../config.json"),
        root.join("../../config.toml"),
    ]
}

/// Non-empty value of an optional variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| WeatherError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}
