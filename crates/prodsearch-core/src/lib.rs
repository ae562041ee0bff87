//! prodsearch core: transport-agnostic telemetry primitives and error types.
//!
//! This crate holds the metrics registry, the text exposition encoder and the
//! closed label vocabularies shared by the gateway and by collaborators such as
//! the search-cluster client and the health poller. It carries no HTTP or
//! runtime dependencies.
//!
//! # Failure policy
//! `unwrap`, `expect` and `panic!` are compile-denied here. The one exception
//! is the label-mismatch policy in [`metrics::registry`], which panics in debug
//! builds only.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;
pub mod telemetry;

/// Shared result type.
pub use error::{ProdSearchError, Result};
