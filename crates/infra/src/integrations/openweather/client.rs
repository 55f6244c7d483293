//! OpenWeather API client for geocoding and forecasts

use std::time::Duration;

use async_trait::async_trait;
use forecal_core::{ForecastProvider, GeocodingProvider};
use forecal_domain::constants::{DEFAULT_PROVIDER_BASE_URL, GEOCODE_CANDIDATE_LIMIT};
use forecal_domain::{
    DailyForecast, ForecastGranularity, ForecastResponse, GeocodedLocation, HourlyForecast,
    ProviderConfig, Result, WeatherError,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::types::GeocodeCandidate;
use crate::http::HttpClient;

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const ONE_CALL_PATH: &str = "/data/2.5/onecall";
const UNITS: &str = "metric";
const MAX_ERROR_BODY_CHARS: usize = 200;

/// OpenWeather API client
pub struct OpenWeatherClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
        }
    }

    /// Point the client at another OpenWeather-compatible host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a client from provider configuration.
    ///
    /// # Errors
    /// Returns `WeatherError::Config` when the API key is empty or the base
    /// URL does not parse.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(WeatherError::Config("weather provider API key is not set".into()));
        }
        Url::parse(&config.base_url).map_err(|err| {
            WeatherError::Config(format!("invalid provider base URL {}: {err}", config.base_url))
        })?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("forecal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::new(config.api_key.clone(), http_client).with_base_url(config.base_url.clone()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self
            .http_client
            .request(Method::GET, format!("{}{path}", self.base_url))
            .query(query)
            .query(&[("appid", self.api_key.as_str())]);

        let response = self.http_client.send(request).await?;
        let status = response.status();
        debug!(path, status = status.as_u16(), "received provider response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(WeatherError::ExternalProvider(format!(
                "{path} returned HTTP {}: {body}",
                status.as_u16()
            )));
        }

        let bytes = response.bytes().await.map_err(|err| {
            WeatherError::ExternalProvider(format!("failed to read {path} response: {err}"))
        })?;
        serde_json::from_slice(&bytes).map_err(|err| {
            WeatherError::ExternalProvider(format!("malformed {path} payload: {err}"))
        })
    }

    async fn one_call(
        &self,
        location: &GeocodedLocation,
        granularity: ForecastGranularity,
    ) -> Result<ForecastResponse> {
        // keep only the sequence being asked for
        let exclude = match granularity {
            ForecastGranularity::Hourly => "current,minutely,daily,alerts",
            ForecastGranularity::Daily => "current,minutely,hourly,alerts",
        };

        self.get_json(
            ONE_CALL_PATH,
            &[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("exclude", exclude.to_string()),
                ("units", UNITS.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl GeocodingProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Vec<GeocodedLocation>> {
        let candidates: Vec<GeocodeCandidate> = self
            .get_json(
                GEOCODE_PATH,
                &[("q", location.to_string()), ("limit", GEOCODE_CANDIDATE_LIMIT.to_string())],
            )
            .await?;

        debug!(candidates = candidates.len(), "geocoding complete");
        Ok(candidates.into_iter().map(GeocodedLocation::from).collect())
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherClient {
    #[instrument(skip(self, location), fields(location = %location.name))]
    async fn hourly_forecast(&self, location: &GeocodedLocation) -> Result<Vec<HourlyForecast>> {
        Ok(self.one_call(location, ForecastGranularity::Hourly).await?.hourly)
    }

    #[instrument(skip(self, location), fields(location = %location.name))]
    async fn daily_forecast(&self, location: &GeocodedLocation) -> Result<Vec<DailyForecast>> {
        Ok(self.one_call(location, ForecastGranularity::Daily).await?.daily)
    }
}
