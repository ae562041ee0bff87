//! In-process metrics: descriptors, registry, snapshots and text exposition.
//!
//! The registry is an explicit object (share it with `Arc`), so tests and
//! embedders can run several independent registries side by side. Series are
//! created lazily per label tuple and live as long as the registry.

pub mod descriptor;
pub mod exposition;
pub mod registry;
pub mod snapshot;

pub use descriptor::{MetricDescriptor, MetricKind, DEFAULT_BUCKETS};
pub use exposition::{encode_text, CONTENT_TYPE};
pub use registry::{Counter, Gauge, Histogram, Registry};
pub use snapshot::{FamilySnapshot, HistogramSnapshot, SampleValue, SeriesSnapshot};
