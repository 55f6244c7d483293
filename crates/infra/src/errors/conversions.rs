//! Conversions from external infrastructure errors into domain errors.

use forecal_domain::WeatherError;
use lapin::Error as BrokerError;
use redis::RedisError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub WeatherError);

impl From<InfraError> for WeatherError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<WeatherError> for InfraError {
    fn from(value: WeatherError) -> Self {
        InfraError(value)
    }
}

/// Convert any supported infrastructure error straight into the domain error.
pub fn to_weather_error<E>(err: E) -> WeatherError
where
    E: Into<InfraError>,
{
    err.into().0
}

trait IntoWeatherError {
    fn into_weather(self) -> WeatherError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → WeatherError */
/* -------------------------------------------------------------------------- */

impl IntoWeatherError for HttpError {
    fn into_weather(self) -> WeatherError {
        if self.is_timeout() {
            return WeatherError::ExternalProvider("HTTP request timed out".into());
        }

        if self.is_connect() {
            return WeatherError::ExternalProvider("HTTP connection failure".into());
        }

        if self.is_decode() {
            return WeatherError::ExternalProvider(format!("malformed provider payload: {self}"));
        }

        if let Some(status) = self.status() {
            return WeatherError::ExternalProvider(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        WeatherError::ExternalProvider(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_weather())
    }
}

/* -------------------------------------------------------------------------- */
/* redis::RedisError → WeatherError */
/* -------------------------------------------------------------------------- */

impl IntoWeatherError for RedisError {
    fn into_weather(self) -> WeatherError {
        if self.is_connection_refusal()
            || self.is_connection_dropped()
            || self.is_io_error()
            || self.is_timeout()
        {
            return WeatherError::Connectivity(format!("redis unreachable: {self}"));
        }

        WeatherError::Store(format!("redis command failed: {self}"))
    }
}

impl From<RedisError> for InfraError {
    fn from(value: RedisError) -> Self {
        InfraError(value.into_weather())
    }
}

/* -------------------------------------------------------------------------- */
/* lapin::Error → WeatherError */
/* -------------------------------------------------------------------------- */

impl IntoWeatherError for BrokerError {
    fn into_weather(self) -> WeatherError {
        WeatherError::Connectivity(format!("broker error: {self}"))
    }
}

impl From<BrokerError> for InfraError {
    fn from(value: BrokerError) -> Self {
        InfraError(value.into_weather())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → WeatherError */
/* -------------------------------------------------------------------------- */

impl IntoWeatherError for JsonError {
    fn into_weather(self) -> WeatherError {
        WeatherError::InvalidInput(format!("invalid JSON at line {}: {self}", self.line()))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_weather())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
