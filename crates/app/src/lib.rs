//! # Forecal App
//!
//! Process wiring shared by the `enrichment-worker`, `background-refresh`
//! and `weather-api` binaries.

pub mod context;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use routes::router;
