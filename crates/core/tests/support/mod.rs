//! Shared test helpers for `forecal-core` integration tests.
//!
//! `Mutex`-backed doubles for every port plus a harness that wires them
//! into an enrichment pipeline, so tests can focus on behaviour.
#![allow(dead_code)]

pub mod doubles;
pub mod fixtures;
