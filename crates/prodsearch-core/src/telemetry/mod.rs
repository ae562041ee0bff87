//! Closed label vocabularies shared with collaborators.
//!
//! The search-cluster client and the health poller live outside this crate;
//! they speak to the metrics through these types so label values stay within
//! a small known set.

pub mod cluster;
pub mod dependency;

pub use cluster::{ClusterHealth, ClusterStatus};
pub use dependency::{CallStatus, EsOperation};
