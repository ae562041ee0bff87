//! Metric catalogue for the product search service.
//!
//! All families are registered up front by [`SearchMetrics::register`]; a
//! name collision aborts startup. After that every method here is a
//! non-blocking in-process call that never fails the caller.

use std::sync::Arc;

use prodsearch_core::error::{ProdSearchError, Result};
use prodsearch_core::metrics::descriptor::full_name;
use prodsearch_core::metrics::{Counter, Gauge, Histogram, MetricDescriptor, Registry};
use prodsearch_core::telemetry::{CallStatus, ClusterHealth, ClusterStatus, EsOperation};

use crate::config::MetricsSection;

const HTTP_LABELS: [&str; 3] = ["method", "handler", "status"];
const ES_LABELS: [&str; 2] = ["op", "status"];

pub struct SearchMetrics {
    registry: Arc<Registry>,

    http_requests: Counter,
    http_duration: Histogram,

    es_requests: Counter,
    es_duration: Histogram,

    cluster_status: Gauge,
    active_shards: Gauge,
    relocating_shards: Gauge,
    unassigned_shards: Gauge,
}

impl SearchMetrics {
    /// Register every family on `registry`.
    ///
    /// All descriptors are checked first, so a conflict leaves the registry
    /// exactly as it was.
    pub fn register(registry: Arc<Registry>, cfg: &MetricsSection) -> Result<Self> {
        let ns = cfg.namespace.as_str();

        let http_requests = MetricDescriptor::counter(
            full_name(ns, "http_requests_total"),
            "Number of HTTP requests by method, route and status.",
            &HTTP_LABELS,
        );
        let http_duration = MetricDescriptor::histogram(
            full_name(ns, "http_request_duration_seconds"),
            "HTTP request handling time in seconds.",
            &HTTP_LABELS,
            &cfg.http_buckets,
        );
        let es_requests = MetricDescriptor::counter(
            full_name(ns, "es_requests_total"),
            "Number of search cluster requests by operation and status.",
            &ES_LABELS,
        );
        let es_duration = MetricDescriptor::histogram(
            full_name(ns, "es_request_duration_seconds"),
            "Search cluster request time in seconds.",
            &ES_LABELS,
            &cfg.dependency_buckets,
        );
        let cluster_status = MetricDescriptor::gauge(
            full_name(ns, "elastic_cluster_status"),
            "Search cluster status: 0=red, 1=yellow, 2=green.",
            &[],
        );
        let active_shards = MetricDescriptor::gauge(
            full_name(ns, "elastic_active_shards"),
            "Number of active shards.",
            &[],
        );
        let relocating_shards = MetricDescriptor::gauge(
            full_name(ns, "elastic_relocating_shards"),
            "Number of relocating shards.",
            &[],
        );
        let unassigned_shards = MetricDescriptor::gauge(
            full_name(ns, "elastic_unassigned_shards"),
            "Number of unassigned shards.",
            &[],
        );

        for desc in [
            &http_requests,
            &http_duration,
            &es_requests,
            &es_duration,
            &cluster_status,
            &active_shards,
            &relocating_shards,
            &unassigned_shards,
        ] {
            desc.validate()?;
            if registry.contains(desc.name()) {
                return Err(ProdSearchError::DuplicateMetric(desc.name().to_string()));
            }
        }

        let metrics = Self {
            http_requests: registry.register_counter(http_requests)?,
            http_duration: registry.register_histogram(http_duration)?,
            es_requests: registry.register_counter(es_requests)?,
            es_duration: registry.register_histogram(es_duration)?,
            cluster_status: registry.register_gauge(cluster_status)?,
            active_shards: registry.register_gauge(active_shards)?,
            relocating_shards: registry.register_gauge(relocating_shards)?,
            unassigned_shards: registry.register_gauge(unassigned_shards)?,
            registry,
        };

        tracing::info!(namespace = %ns, families = metrics.registry.len(), "metrics registered");
        Ok(metrics)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Prometheus text snapshot of the whole registry.
    pub fn render(&self) -> Result<String> {
        self.registry.render_text()
    }

    // --------------------
    // Inbound HTTP
    // --------------------

    /// `route` must be a route pattern or a sentinel, never a raw path.
    pub fn record_http_request(&self, method: &str, route: &str, status: u16, secs: f64) {
        let status = status.to_string();
        let labels = [
            ("method", method_label(method)),
            ("handler", route),
            ("status", status.as_str()),
        ];
        self.http_requests.inc(&labels);
        self.http_duration.observe(&labels, secs);
    }

    pub fn http_requests(&self) -> &Counter {
        &self.http_requests
    }

    pub fn http_duration(&self) -> &Histogram {
        &self.http_duration
    }

    // --------------------
    // Search cluster calls
    // --------------------

    pub fn record_dependency_call(&self, op: EsOperation, status: CallStatus, secs: f64) {
        let labels = [("op", op.as_str()), ("status", status.as_str())];
        self.es_requests.inc(&labels);
        self.es_duration.observe(&labels, secs);
    }

    pub fn es_requests(&self) -> &Counter {
        &self.es_requests
    }

    pub fn es_duration(&self) -> &Histogram {
        &self.es_duration
    }

    // --------------------
    // Cluster health (set by the poller)
    // --------------------

    /// Raw ordinal; see [`ClusterStatus::ordinal`] for the mapping.
    pub fn set_cluster_status(&self, ordinal: i64) {
        self.cluster_status.set(&[], ordinal);
    }

    pub fn set_cluster_state(&self, status: ClusterStatus) {
        self.set_cluster_status(status.ordinal());
    }

    pub fn set_active_shards(&self, n: i64) {
        self.active_shards.set(&[], n);
    }

    pub fn set_relocating_shards(&self, n: i64) {
        self.relocating_shards.set(&[], n);
    }

    pub fn set_unassigned_shards(&self, n: i64) {
        self.unassigned_shards.set(&[], n);
    }

    pub fn set_shard_counts(&self, active: i64, relocating: i64, unassigned: i64) {
        self.set_active_shards(active);
        self.set_relocating_shards(relocating);
        self.set_unassigned_shards(unassigned);
    }

    /// Set all four health gauges from one `_cluster/health` reading.
    pub fn apply_cluster_health(&self, health: &ClusterHealth) {
        self.set_cluster_state(health.status);
        self.set_shard_counts(
            health.active_shards,
            health.relocating_shards,
            health.unassigned_shards,
        );
    }

    pub fn cluster_status(&self) -> Option<i64> {
        self.cluster_status.get(&[])
    }

    pub fn active_shards(&self) -> Option<i64> {
        self.active_shards.get(&[])
    }

    pub fn relocating_shards(&self) -> Option<i64> {
        self.relocating_shards.get(&[])
    }

    pub fn unassigned_shards(&self) -> Option<i64> {
        self.unassigned_shards.get(&[])
    }
}

/// Extension methods collapse to `OTHER` so they cannot grow the label set.
fn method_label(method: &str) -> &str {
    match method {
        "GET" | "HEAD" | "POST" | "PUT" | "DELETE" | "CONNECT" | "OPTIONS" | "TRACE" | "PATCH" => {
            method
        }
        _ => "OTHER",
    }
}
