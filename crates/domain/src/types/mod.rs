//! Domain types and models

pub mod event;
pub mod forecast;
pub mod weather;

pub use event::{Event, EventCreated};
pub use forecast::{
    DailyForecast, DailyTemperatures, DayPart, ForecastGranularity, ForecastResponse,
    HourlyForecast, WeatherInfo,
};
pub use weather::{GeocodedLocation, WeatherSummary};
