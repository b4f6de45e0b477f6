//! Observability module for the tap service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
