//! Shared application state for the prodsearch gateway.
//!
//! The metrics registry is built here and injected everywhere through
//! `AppState`; there is no process global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use prodsearch_core::error::Result;
use prodsearch_core::metrics::Registry;

use crate::config::GatewayConfig;
use crate::obs::SearchMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<SearchMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    draining: AtomicBool,
}

impl AppState {
    /// Build state with a fresh registry.
    /// Registration errors are returned so main can refuse to start.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build state on a caller-provided registry (e.g. shared with other components).
    pub fn with_registry(cfg: GatewayConfig, registry: Arc<Registry>) -> Result<Self> {
        let metrics = SearchMetrics::register(registry, &cfg.metrics)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                draining: AtomicBool::new(false),
            }),
            metrics: Arc::new(metrics),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<SearchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Mark draining state.
    pub fn set_draining(&self) {
        self.inner.draining.store(true, Ordering::Relaxed);
    }

    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.inner.draining.load(Ordering::Relaxed)
    }
}
