//! Weather provider forecast payloads
//!
//! Mirrors the provider's one-call response: two parallel sequences of
//! hourly and daily points, each carrying an ordered list of weather
//! conditions of which only the first is meaningful to us.

use serde::{Deserialize, Serialize};

use crate::constants::{DAY_BEFORE_HOUR, EVENING_BEFORE_HOUR, MORNING_BEFORE_HOUR};
use crate::impl_label_conversions;

/// Forecast granularity chosen from an event's lead time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastGranularity {
    Hourly,
    Daily,
}

impl_label_conversions!(ForecastGranularity {
    Hourly => "hourly",
    Daily => "daily",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub hourly: Vec<HourlyForecast>,
    #[serde(default)]
    pub daily: Vec<DailyForecast>,
}

/// One hourly forecast point. `dt` is epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub weather: Vec<WeatherInfo>,
}

/// One daily forecast point, stamped at midday of its date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub dt: i64,
    pub temp: DailyTemperatures,
    #[serde(default)]
    pub weather: Vec<WeatherInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTemperatures {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

impl DailyTemperatures {
    pub fn for_part(&self, part: DayPart) -> f64 {
        match part {
            DayPart::Morning => self.morn,
            DayPart::Day => self.day,
            DayPart::Evening => self.eve,
            DayPart::Night => self.night,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub id: i64,
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

/// Part of the day used to pick a daily temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Day,
    Evening,
    Night,
}

impl_label_conversions!(DayPart {
    Morning => "morning",
    Day => "day",
    Evening => "evening",
    Night => "night",
});

impl DayPart {
    /// Band for a local hour (0-23).
    pub fn for_hour(hour: u32) -> Self {
        if hour < MORNING_BEFORE_HOUR {
            Self::Morning
        } else if hour < DAY_BEFORE_HOUR {
            Self::Day
        } else if hour < EVENING_BEFORE_HOUR {
            Self::Evening
        } else {
            Self::Night
        }
    }
}
