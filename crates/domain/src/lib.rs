//! # Forecal Domain
//!
//! Business domain types for the calendar weather enrichment pipeline.
//!
//! This crate contains:
//! - Events, geocoded locations, weather summaries and forecast payloads
//! - The domain error type and `Result` alias
//! - Configuration structures
//! - Broker topology, store key layout and forecast window constants
//!
//! ## Architecture
//! - No dependencies on other forecal crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
