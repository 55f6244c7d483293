//! Free-text location to coordinates, cached indefinitely

pub mod ports;
pub mod service;

pub use service::GeocodeService;
