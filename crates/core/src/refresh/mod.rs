//! Periodic re-enrichment of upcoming events

pub mod coordinator;
pub mod pool;
pub mod ports;

pub use coordinator::{BatchRefreshCoordinator, RefreshReport, RefreshSettings};
pub use pool::{PoolReport, WorkerPool};
