use std::net::SocketAddr;

use serde::Deserialize;

use prodsearch_core::error::{ProdSearchError, Result};
use prodsearch_core::metrics::descriptor::{is_valid_metric_name, validate_buckets};
use prodsearch_core::metrics::DEFAULT_BUCKETS;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ProdSearchError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ProdSearchError::InvalidConfig(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Prefix for every metric name (`<namespace>_<suffix>`).
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Exposition route.
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_buckets")]
    pub http_buckets: Vec<f64>,

    #[serde(default = "default_buckets")]
    pub dependency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            path: default_path(),
            http_buckets: default_buckets(),
            dependency_buckets: default_buckets(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.namespace.is_empty() && !is_valid_metric_name(&self.namespace) {
            return Err(ProdSearchError::InvalidConfig(format!(
                "metrics.namespace is not a valid metric name prefix: {:?}",
                self.namespace
            )));
        }
        if !self.path.starts_with('/') || self.path.len() < 2 {
            return Err(ProdSearchError::InvalidConfig(
                "metrics.path must start with '/' and name a route".into(),
            ));
        }
        if self.path.contains("//") || self.path.contains([':', '*']) {
            return Err(ProdSearchError::InvalidConfig(format!(
                "metrics.path must be a static route without empty segments: {}",
                self.path
            )));
        }
        if matches!(self.path.as_str(), "/healthz" | "/readyz") {
            return Err(ProdSearchError::InvalidConfig(format!(
                "metrics.path collides with an ops route: {}",
                self.path
            )));
        }
        validate_buckets(&self.http_buckets)
            .map_err(|e| ProdSearchError::InvalidConfig(format!("metrics.http_buckets: {e}")))?;
        validate_buckets(&self.dependency_buckets).map_err(|e| {
            ProdSearchError::InvalidConfig(format!("metrics.dependency_buckets: {e}"))
        })?;
        Ok(())
    }
}

fn default_namespace() -> String {
    "product_search".into()
}
fn default_path() -> String {
    "/metrics".into()
}
fn default_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}
