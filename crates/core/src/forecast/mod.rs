//! Forecast point selection

pub mod ports;
pub mod selector;

pub use selector::{select_bucket, ForecastBucket, ForecastSelector};
