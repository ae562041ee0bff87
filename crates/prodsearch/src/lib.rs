//! Top-level facade crate for prodsearch.
//!
//! Re-exports the telemetry core and the gateway library so users can depend on a single crate.

pub mod core {
    pub use prodsearch_core::*;
}

pub mod gateway {
    pub use prodsearch_gateway::*;
}
