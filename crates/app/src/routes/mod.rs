//! Weather read API
//!
//! `GET /event/{id}` serves the cached summary for an event and
//! `GET /health` answers liveness probes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use forecal_core::WeatherStore;
use forecal_domain::{WeatherError, WeatherSummary};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

#[derive(Serialize)]
struct EventWeather {
    data: WeatherData,
}

#[derive(Serialize)]
struct WeatherData {
    weather: WeatherSummary,
}

pub fn router(weather: Arc<dyn WeatherStore>) -> Router {
    Router::new()
        .route("/event/{id}", get(event_weather))
        .route("/health", get(health))
        .with_state(weather)
}

async fn event_weather(
    State(weather): State<Arc<dyn WeatherStore>>,
    Path(id): Path<String>,
) -> Response {
    match weather.get(&id).await {
        Ok(summary) => {
            Json(EventWeather { data: WeatherData { weather: summary } }).into_response()
        }
        Err(WeatherError::NotFound(_)) => {
            debug!(event_id = %id, "no cached weather");
            (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
        }
        Err(err) => {
            error!(event_id = %id, error = %err, "weather lookup failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": err.label() }))).into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
