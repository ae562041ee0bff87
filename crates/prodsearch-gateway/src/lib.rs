//! prodsearch gateway library entry.
//!
//! HTTP host for the search service telemetry: config loading, the metric
//! catalogue, request instrumentation middleware, and the operational
//! endpoints. Consumed by the binary (`main.rs`) and by integration tests.
//! Search routes themselves are supplied by the caller of
//! [`router::build_router`].

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
