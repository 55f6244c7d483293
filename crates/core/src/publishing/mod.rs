//! Announcing persisted events to the enrichment pipeline

pub mod ports;
pub mod service;

pub use service::EventChangePublisher;
