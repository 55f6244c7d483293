//! Per-event enrichment: geocode, pick a forecast point, cache the summary

pub mod handler;
pub mod pipeline;
pub mod ports;

pub use handler::{EnrichmentHandler, EnrichmentOutcome};
pub use pipeline::{Enrichment, EnrichmentFailure, EnrichmentPipeline, EnrichmentStage};
