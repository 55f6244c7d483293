//! Fixtures and a pipeline harness built from the doubles

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use forecal_core::{
    EnrichmentHandler, EnrichmentPipeline, ForecastSelector, GeocodeService, MockClock,
};
use forecal_domain::{
    DailyForecast, DailyTemperatures, Event, GeocodedLocation, HourlyForecast, WeatherInfo,
};

use super::doubles::{
    MockForecastProvider, MockGeocodeStore, MockGeocodingProvider, MockWeatherStore,
};

pub const WEATHER_TTL: Duration = Duration::from_secs(3600);

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn at_offset(hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(hours * 3600).unwrap().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn london() -> GeocodedLocation {
    GeocodedLocation {
        name: "London".into(),
        latitude: 51.5073,
        longitude: -0.1276,
        country: "GB".into(),
    }
}

pub fn condition(main: &str, description: &str) -> WeatherInfo {
    WeatherInfo { id: 800, main: main.into(), description: description.into(), icon: "01d".into() }
}

pub fn hourly_point(at: DateTime<Utc>, temp: f64, main: &str) -> HourlyForecast {
    HourlyForecast {
        dt: at.timestamp(),
        temp,
        feels_like: temp - 1.0,
        weather: vec![condition(main, &main.to_lowercase())],
    }
}

/// Daily point with distinct temperatures per part of the day:
/// morn 1, day 2, eve 3, night 4.
pub fn daily_point(at: DateTime<FixedOffset>, main: &str) -> DailyForecast {
    DailyForecast {
        dt: at.timestamp(),
        temp: DailyTemperatures { morn: 1.0, day: 2.0, eve: 3.0, night: 4.0 },
        weather: vec![condition(main, &main.to_lowercase())],
    }
}

pub fn event(id: &str, location: &str, starts_at: DateTime<FixedOffset>) -> Event {
    Event {
        id: id.into(),
        title: format!("meeting {id}"),
        location: location.into(),
        starts_at,
        ends_at: starts_at + chrono::Duration::hours(1),
        created_at: utc(2023, 12, 31, 12, 0),
    }
}

/// Doubles wired into a pipeline, with "London" resolvable by the provider.
pub struct Harness {
    pub clock: MockClock,
    pub geocode_store: Arc<MockGeocodeStore>,
    pub geocoder: Arc<MockGeocodingProvider>,
    pub forecasts: Arc<MockForecastProvider>,
    pub weather: Arc<MockWeatherStore>,
}

impl Harness {
    pub fn new(now: DateTime<Utc>, forecasts: MockForecastProvider) -> Self {
        Self {
            clock: MockClock::at(now),
            geocode_store: Arc::new(MockGeocodeStore::default()),
            geocoder: Arc::new(
                MockGeocodingProvider::default().with_candidates("London", vec![london()]),
            ),
            forecasts: Arc::new(forecasts),
            weather: Arc::new(MockWeatherStore::default()),
        }
    }

    pub fn with_weather_store(mut self, weather: MockWeatherStore) -> Self {
        self.weather = Arc::new(weather);
        self
    }

    pub fn with_geocoder(mut self, geocoder: MockGeocodingProvider) -> Self {
        self.geocoder = Arc::new(geocoder);
        self
    }

    pub fn geocode_service(&self) -> GeocodeService {
        GeocodeService::new(self.geocode_store.clone(), self.geocoder.clone())
    }

    pub fn selector(&self) -> ForecastSelector {
        ForecastSelector::new(self.forecasts.clone(), Arc::new(self.clock.clone()))
    }

    pub fn pipeline(&self) -> Arc<EnrichmentPipeline> {
        Arc::new(EnrichmentPipeline::new(
            self.geocode_service(),
            self.selector(),
            self.weather.clone(),
            WEATHER_TTL,
        ))
    }

    pub fn handler(&self) -> EnrichmentHandler {
        EnrichmentHandler::new(self.pipeline(), Arc::new(self.clock.clone()))
    }
}
