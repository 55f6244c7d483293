/// OpenWeather integration for geocoding and forecasts
///
/// One client implements both the geocoding and the forecast provider ports
/// against an OpenWeather-compatible API:
///
/// - `GET {base}/geo/1.0/direct?q=&limit=1&appid=` for geocoding
/// - `GET {base}/data/2.5/onecall?lat=&lon=&exclude=&units=metric&appid=` for
///   hourly and daily forecasts
///
/// # Usage
///
/// ```no_run
/// use forecal_core::GeocodingProvider;
/// use forecal_infra::http::HttpClient;
/// use forecal_infra::integrations::openweather::OpenWeatherClient;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api_key = std::env::var("FORECAL_PROVIDER_API_KEY")?;
/// let client = OpenWeatherClient::new(api_key, HttpClient::new()?);
///
/// let candidates = client.geocode("London").await?;
/// println!("{} candidates", candidates.len());
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// Every failure is a [`forecal_domain::WeatherError::ExternalProvider`]:
/// transport errors, non-success statuses and payloads that do not decode.
/// Nothing is retried.
pub mod client;
pub mod types;

pub use client::OpenWeatherClient;
pub use types::GeocodeCandidate;
