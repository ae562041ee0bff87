//! Static metric descriptors.

use crate::error::{ProdSearchError, Result};

/// Prometheus client default buckets (seconds).
pub const DEFAULT_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
    Gauge,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Immutable description of one metric family.
///
/// Built once at startup and handed to [`Registry`](super::Registry).
/// `label_names` keeps declaration order; observations may pass labels in any
/// order and are normalized to this one.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    name: String,
    help: String,
    kind: MetricKind,
    label_names: Vec<String>,
    buckets: Vec<f64>,
}

impl MetricDescriptor {
    pub fn counter(name: impl Into<String>, help: impl Into<String>, labels: &[&str]) -> Self {
        Self::new(name.into(), help.into(), MetricKind::Counter, labels, Vec::new())
    }

    pub fn gauge(name: impl Into<String>, help: impl Into<String>, labels: &[&str]) -> Self {
        Self::new(name.into(), help.into(), MetricKind::Gauge, labels, Vec::new())
    }

    pub fn histogram(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[&str],
        buckets: &[f64],
    ) -> Self {
        Self::new(
            name.into(),
            help.into(),
            MetricKind::Histogram,
            labels,
            buckets.to_vec(),
        )
    }

    fn new(
        name: String,
        help: String,
        kind: MetricKind,
        labels: &[&str],
        buckets: Vec<f64>,
    ) -> Self {
        Self {
            name,
            help,
            kind,
            label_names: labels.iter().map(|l| l.to_string()).collect(),
            buckets,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Upper bounds in ascending order. Empty for counters and gauges.
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    /// Check naming rules and bucket layout.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_metric_name(&self.name) {
            return Err(ProdSearchError::InvalidDescriptor(format!(
                "bad metric name: {:?}",
                self.name
            )));
        }

        for (i, label) in self.label_names.iter().enumerate() {
            if !is_valid_label_name(label) || label.starts_with("__") {
                return Err(ProdSearchError::InvalidDescriptor(format!(
                    "{}: bad label name {:?}",
                    self.name, label
                )));
            }
            if self.label_names[..i].contains(label) {
                return Err(ProdSearchError::InvalidDescriptor(format!(
                    "{}: duplicate label {:?}",
                    self.name, label
                )));
            }
        }

        match self.kind {
            MetricKind::Histogram => {
                if self.label_names.iter().any(|l| l == "le") {
                    return Err(ProdSearchError::InvalidDescriptor(format!(
                        "{}: `le` is reserved for histogram buckets",
                        self.name
                    )));
                }
                validate_buckets(&self.buckets).map_err(|msg| {
                    ProdSearchError::InvalidDescriptor(format!("{}: {msg}", self.name))
                })?;
            }
            MetricKind::Counter | MetricKind::Gauge => {
                if !self.buckets.is_empty() {
                    return Err(ProdSearchError::InvalidDescriptor(format!(
                        "{}: buckets only apply to histograms",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// `<namespace>_<suffix>`, or just the suffix when the namespace is empty.
pub fn full_name(namespace: &str, suffix: &str) -> String {
    if namespace.is_empty() {
        suffix.to_string()
    } else {
        format!("{namespace}_{suffix}")
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Buckets must be non-empty, finite and strictly increasing. `+Inf` is implicit.
pub fn validate_buckets(buckets: &[f64]) -> std::result::Result<(), String> {
    if buckets.is_empty() {
        return Err("histogram needs at least one bucket".into());
    }
    if buckets.iter().any(|b| !b.is_finite()) {
        return Err("bucket bounds must be finite".into());
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err("bucket bounds must be strictly increasing".into());
    }
    Ok(())
}
