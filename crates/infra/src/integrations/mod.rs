//! External service integrations

pub mod openweather;
