//! Service telemetry on top of the core registry.
//!
//! - [`metrics`]: the metric catalogue and the in-process recording API
//! - [`middleware`]: per-request counter/histogram observation
//! - [`dependency`]: timing helpers for search-cluster calls

pub mod dependency;
pub mod metrics;
pub mod middleware;

pub use metrics::SearchMetrics;
