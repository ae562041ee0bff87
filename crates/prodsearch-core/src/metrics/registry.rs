//! Metrics registry with typed handles.
//!
//! Each family keeps its series in a `DashMap` keyed by label values in
//! declared order. A lookup takes a shard read lock; the first observation of
//! a new tuple goes through the `entry` API so concurrent writers agree on a
//! single series. Counters and gauges are plain atomics. Histograms take a
//! per-series mutex so `count`, `sum` and the buckets always move together.

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use dashmap::DashMap;

use super::descriptor::{MetricDescriptor, MetricKind};
use super::exposition::encode_text;
use super::snapshot::{FamilySnapshot, HistogramSnapshot, SampleValue, SeriesSnapshot};
use crate::error::{ProdSearchError, Result};

/// Process-wide (or test-local) collection of metric families.
#[derive(Default)]
pub struct Registry {
    families: RwLock<Vec<Arc<Family>>>,
    dropped: Arc<AtomicU64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_counter(&self, desc: MetricDescriptor) -> Result<Counter> {
        self.register(desc, MetricKind::Counter)
            .map(|family| Counter { family })
    }

    pub fn register_gauge(&self, desc: MetricDescriptor) -> Result<Gauge> {
        self.register(desc, MetricKind::Gauge)
            .map(|family| Gauge { family })
    }

    pub fn register_histogram(&self, desc: MetricDescriptor) -> Result<Histogram> {
        self.register(desc, MetricKind::Histogram)
            .map(|family| Histogram { family })
    }

    fn register(&self, desc: MetricDescriptor, kind: MetricKind) -> Result<Arc<Family>> {
        if desc.kind() != kind {
            return Err(ProdSearchError::InvalidDescriptor(format!(
                "{} is a {}, not a {}",
                desc.name(),
                desc.kind().as_str(),
                kind.as_str()
            )));
        }
        desc.validate()?;

        let mut families = self
            .families
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if families.iter().any(|f| f.desc.name() == desc.name()) {
            return Err(ProdSearchError::DuplicateMetric(desc.name().to_string()));
        }

        tracing::debug!(metric = %desc.name(), kind = kind.as_str(), "metric registered");
        let series = DashMap::new();
        // a family without labels has exactly one tuple; export it from the start
        if desc.label_names().is_empty() {
            series.insert(Vec::new(), Arc::new(Series::new(&desc)));
        }
        let family = Arc::new(Family {
            desc,
            series,
            dropped: Arc::clone(&self.dropped),
        });
        families.push(Arc::clone(&family));
        Ok(family)
    }

    /// Copy every family's current values.
    ///
    /// The family list lock is only held while cloning `Arc`s; series values
    /// are read afterwards, one shard at a time.
    pub fn gather(&self) -> Vec<FamilySnapshot> {
        let families: Vec<Arc<Family>> = self
            .families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        families.iter().map(|f| f.snapshot()).collect()
    }

    /// Gather and encode in Prometheus text format.
    pub fn render_text(&self) -> Result<String> {
        encode_text(&self.gather())
    }

    /// Observations discarded instead of applied: label mismatches in release
    /// builds, and non-finite histogram samples.
    pub fn dropped_observations(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Whether a family with this full name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|f| f.desc.name() == name)
    }

    pub fn len(&self) -> usize {
        self.families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Family {
    desc: MetricDescriptor,
    series: DashMap<Vec<String>, Arc<Series>>,
    dropped: Arc<AtomicU64>,
}

enum Series {
    Counter(AtomicU64),
    Gauge(AtomicI64),
    Histogram(Mutex<HistogramState>),
}

struct HistogramState {
    /// Cumulative: slot `i` counts observations `<= bounds[i]`.
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

impl Series {
    fn new(desc: &MetricDescriptor) -> Self {
        match desc.kind() {
            MetricKind::Counter => Series::Counter(AtomicU64::new(0)),
            MetricKind::Gauge => Series::Gauge(AtomicI64::new(0)),
            MetricKind::Histogram => Series::Histogram(Mutex::new(HistogramState {
                buckets: vec![0; desc.buckets().len()],
                sum: 0.0,
                count: 0,
            })),
        }
    }
}

impl Family {
    /// Reorder label pairs into declared order, or report a mismatch.
    fn key(&self, labels: &[(&str, &str)]) -> Result<Vec<String>> {
        let declared = self.desc.label_names();
        let key: Option<Vec<String>> = if labels.len() == declared.len() {
            declared
                .iter()
                .map(|name| {
                    labels
                        .iter()
                        .find(|(k, _)| *k == name.as_str())
                        .map(|(_, v)| v.to_string())
                })
                .collect()
        } else {
            None
        };

        key.ok_or_else(|| ProdSearchError::LabelMismatch {
            metric: self.desc.name().to_string(),
            expected: declared.to_vec(),
            got: labels.iter().map(|(k, _)| k.to_string()).collect(),
        })
    }

    /// Get-or-insert the series for `labels`.
    fn series(&self, labels: &[(&str, &str)]) -> Result<Arc<Series>> {
        let key = self.key(labels)?;
        let hit = self.series.get(&key).map(|s| Arc::clone(s.value()));
        if let Some(series) = hit {
            return Ok(series);
        }
        let entry = self
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(Series::new(&self.desc)));
        Ok(Arc::clone(entry.value()))
    }

    /// Existing series only; never creates one.
    fn existing(&self, labels: &[(&str, &str)]) -> Option<Arc<Series>> {
        let key = self.key(labels).ok()?;
        self.series.get(&key).map(|s| Arc::clone(s.value()))
    }

    /// Discard a failed observation. Label mismatches fail loudly in debug
    /// builds; everything else is logged and counted.
    #[allow(clippy::panic)]
    fn reject(&self, err: ProdSearchError) {
        if cfg!(debug_assertions) && matches!(err, ProdSearchError::LabelMismatch { .. }) {
            panic!("{err}");
        }
        self.dropped.fetch_add(1, Ordering::Relaxed);
        tracing::error!(metric = %self.desc.name(), error = %err, "observation dropped");
    }

    fn snapshot(&self) -> FamilySnapshot {
        let mut entries: Vec<(Vec<String>, Arc<Series>)> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let series = entries
            .into_iter()
            .map(|(values, series)| SeriesSnapshot {
                labels: self
                    .desc
                    .label_names()
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect(),
                value: self.read(&series),
            })
            .collect();

        FamilySnapshot {
            name: self.desc.name().to_string(),
            help: self.desc.help().to_string(),
            kind: self.desc.kind(),
            series,
        }
    }

    fn read(&self, series: &Series) -> SampleValue {
        match series {
            Series::Counter(v) => SampleValue::Counter(v.load(Ordering::Relaxed)),
            Series::Gauge(v) => SampleValue::Gauge(v.load(Ordering::Relaxed)),
            Series::Histogram(state) => {
                let state = state.lock().unwrap_or_else(PoisonError::into_inner);
                SampleValue::Histogram(HistogramSnapshot {
                    buckets: self
                        .desc
                        .buckets()
                        .iter()
                        .copied()
                        .zip(state.buckets.iter().copied())
                        .collect(),
                    sum: state.sum,
                    count: state.count,
                })
            }
        }
    }
}

/// Monotonic counter family.
#[derive(Clone)]
pub struct Counter {
    family: Arc<Family>,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.inc_by(labels, 1);
    }

    /// Increment by an arbitrary amount.
    pub fn inc_by(&self, labels: &[(&str, &str)], v: u64) {
        if let Err(e) = self.try_inc_by(labels, v) {
            self.family.reject(e);
        }
    }

    pub fn try_inc_by(&self, labels: &[(&str, &str)], v: u64) -> Result<()> {
        if let Series::Counter(c) = &*self.family.series(labels)? {
            c.fetch_add(v, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Current value, `None` if the tuple was never observed.
    pub fn get(&self, labels: &[(&str, &str)]) -> Option<u64> {
        match &*self.family.existing(labels)? {
            Series::Counter(c) => Some(c.load(Ordering::Relaxed)),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        self.family.desc.name()
    }
}

/// Overwritable gauge family.
#[derive(Clone)]
pub struct Gauge {
    family: Arc<Family>,
}

impl Gauge {
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        if let Err(e) = self.try_set(labels, v) {
            self.family.reject(e);
        }
    }

    pub fn try_set(&self, labels: &[(&str, &str)], v: i64) -> Result<()> {
        if let Series::Gauge(g) = &*self.family.series(labels)? {
            g.store(v, Ordering::Relaxed);
        }
        Ok(())
    }

    /// Add a signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        if let Err(e) = self.try_add(labels, v) {
            self.family.reject(e);
        }
    }

    pub fn try_add(&self, labels: &[(&str, &str)], v: i64) -> Result<()> {
        if let Series::Gauge(g) = &*self.family.series(labels)? {
            g.fetch_add(v, Ordering::Relaxed);
        }
        Ok(())
    }

    pub fn sub(&self, labels: &[(&str, &str)], v: i64) {
        self.add(labels, v.wrapping_neg());
    }

    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        match &*self.family.existing(labels)? {
            Series::Gauge(g) => Some(g.load(Ordering::Relaxed)),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        self.family.desc.name()
    }
}

/// Cumulative-bucket histogram family.
#[derive(Clone)]
pub struct Histogram {
    family: Arc<Family>,
}

impl Histogram {
    pub fn observe(&self, labels: &[(&str, &str)], v: f64) {
        if let Err(e) = self.try_observe(labels, v) {
            self.family.reject(e);
        }
    }

    /// NaN and infinite samples are refused before any series is touched.
    pub fn try_observe(&self, labels: &[(&str, &str)], v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(ProdSearchError::InvalidSample(format!(
                "{}: {v}",
                self.family.desc.name()
            )));
        }
        if let Series::Histogram(state) = &*self.family.series(labels)? {
            let bounds = self.family.desc.buckets();
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            for (slot, &le) in state.buckets.iter_mut().zip(bounds) {
                if v <= le {
                    *slot += 1;
                }
            }
            state.count += 1;
            state.sum += v;
        }
        Ok(())
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<HistogramSnapshot> {
        let series = self.family.existing(labels)?;
        match self.family.read(&series) {
            SampleValue::Histogram(h) => Some(h),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        self.family.desc.name()
    }
}

macro_rules! debug_by_name {
    ($($handle:ident),*) => {$(
        impl fmt::Debug for $handle {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("name", &self.name())
                    .finish()
            }
        }
    )*};
}

debug_by_name!(Counter, Gauge, Histogram);
