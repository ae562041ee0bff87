//! Registry behaviour: registration, label handling, concurrency.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use prodsearch_core::metrics::{MetricDescriptor, Registry, SampleValue, DEFAULT_BUCKETS};

fn requests(reg: &Registry) -> prodsearch_core::metrics::Counter {
    reg.register_counter(MetricDescriptor::counter(
        "t_requests_total",
        "requests",
        &["method", "handler", "status"],
    ))
    .unwrap()
}

#[test]
fn duplicate_name_is_rejected() {
    let reg = Registry::new();
    requests(&reg);
    let err = reg
        .register_gauge(MetricDescriptor::gauge("t_requests_total", "again", &[]))
        .expect_err("duplicate must fail");
    assert_eq!(err.code().as_str(), "DUPLICATE_METRIC");
    assert_eq!(reg.len(), 1);
}

#[test]
fn malformed_descriptors_are_rejected() {
    let reg = Registry::new();
    let bad_name = reg.register_counter(MetricDescriptor::counter("1bad", "x", &[]));
    assert_eq!(bad_name.err().unwrap().code().as_str(), "INVALID_DESCRIPTOR");

    let dup_label = reg.register_counter(MetricDescriptor::counter("ok", "x", &["a", "a"]));
    assert!(dup_label.is_err());

    let le_label =
        reg.register_histogram(MetricDescriptor::histogram("h", "x", &["le"], &DEFAULT_BUCKETS));
    assert!(le_label.is_err());

    let unsorted = reg.register_histogram(MetricDescriptor::histogram("h", "x", &[], &[1.0, 0.5]));
    assert!(unsorted.is_err());

    let wrong_kind = reg.register_gauge(MetricDescriptor::counter("c", "x", &[]));
    assert!(wrong_kind.is_err());

    assert!(reg.is_empty());
}

#[test]
fn labels_are_accepted_in_any_order() {
    let reg = Registry::new();
    let c = requests(&reg);
    c.inc(&[("method", "GET"), ("handler", "/search"), ("status", "200")]);
    c.inc(&[("status", "200"), ("method", "GET"), ("handler", "/search")]);

    assert_eq!(
        c.get(&[("handler", "/search"), ("status", "200"), ("method", "GET")]),
        Some(2)
    );
    let snap = reg.gather();
    assert_eq!(snap[0].series.len(), 1);
    assert_eq!(
        snap[0].series[0].labels,
        vec![
            ("method".to_string(), "GET".to_string()),
            ("handler".to_string(), "/search".to_string()),
            ("status".to_string(), "200".to_string()),
        ]
    );
}

#[test]
fn try_variants_report_label_mismatch() {
    let reg = Registry::new();
    let c = requests(&reg);
    let err = c
        .try_inc_by(&[("method", "GET"), ("route", "/x"), ("status", "200")], 1)
        .expect_err("wrong label name");
    assert_eq!(err.code().as_str(), "LABEL_MISMATCH");

    let err = c.try_inc_by(&[("method", "GET")], 1).expect_err("wrong arity");
    assert_eq!(err.code().as_str(), "LABEL_MISMATCH");

    assert!(reg.gather()[0].series.is_empty());
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "label mismatch")]
fn label_mismatch_panics_in_debug_builds() {
    let reg = Registry::new();
    let c = requests(&reg);
    c.inc(&[("method", "GET")]);
}

#[test]
fn concurrent_increments_are_not_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1_000;

    let reg = Arc::new(Registry::new());
    let c = requests(&reg);
    let h = reg
        .register_histogram(MetricDescriptor::histogram(
            "t_duration_seconds",
            "latency",
            &["method", "handler", "status"],
            &DEFAULT_BUCKETS,
        ))
        .unwrap();

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let c = c.clone();
            let h = h.clone();
            thread::spawn(move || {
                let labels = [("method", "GET"), ("handler", "/search"), ("status", "200")];
                for _ in 0..PER_THREAD {
                    c.inc(&labels);
                    h.observe(&labels, 0.02);
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let labels = [("method", "GET"), ("handler", "/search"), ("status", "200")];
    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(c.get(&labels), Some(total));
    let hist = h.get(&labels).unwrap();
    assert_eq!(hist.count, total);
    assert!((hist.sum - 0.02 * total as f64).abs() < 1e-6);
}

#[test]
fn concurrent_first_observation_creates_one_series() {
    let reg = Arc::new(Registry::new());
    let g = reg
        .register_gauge(MetricDescriptor::gauge("t_gauge", "g", &["shard"]))
        .unwrap();

    let workers: Vec<_> = (0..16)
        .map(|_| {
            let g = g.clone();
            thread::spawn(move || g.inc(&[("shard", "a")]))
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    let snap = reg.gather();
    assert_eq!(snap[0].series.len(), 1);
    assert_eq!(snap[0].series[0].value, SampleValue::Gauge(16));
}

#[test]
fn histogram_buckets_are_cumulative() {
    let reg = Registry::new();
    let h = reg
        .register_histogram(MetricDescriptor::histogram(
            "t_hist",
            "h",
            &[],
            &[0.1, 0.5, 1.0],
        ))
        .unwrap();
    for v in [0.05, 0.1, 0.3, 0.7, 2.0] {
        h.observe(&[], v);
    }

    let snap = h.get(&[]).unwrap();
    assert_eq!(snap.buckets, vec![(0.1, 2), (0.5, 3), (1.0, 4)]);
    assert!(snap.buckets.windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(snap.count, 5);
    assert!(snap.buckets.last().unwrap().1 <= snap.count);
    assert!((snap.sum - 3.15).abs() < 1e-9);
}

#[test]
fn gauge_is_last_write_wins() {
    let reg = Registry::new();
    let g = reg
        .register_gauge(MetricDescriptor::gauge("t_status", "s", &[]))
        .unwrap();
    assert_eq!(g.get(&[]), Some(0));

    g.set(&[], 1);
    assert_eq!(g.get(&[]), Some(1));
    g.set(&[], 2);
    assert_eq!(g.get(&[]), Some(2));

    g.add(&[], 5);
    g.sub(&[], 3);
    g.dec(&[]);
    assert_eq!(g.get(&[]), Some(3));
}

#[test]
fn independent_registries_do_not_share_state() {
    let a = Registry::new();
    let b = Registry::new();
    let ca = requests(&a);
    let cb = requests(&b);
    let labels = [("method", "GET"), ("handler", "/"), ("status", "200")];

    ca.inc(&labels);
    assert_eq!(ca.get(&labels), Some(1));
    assert_eq!(cb.get(&labels), None);
}

#[test]
fn gather_does_not_mutate() {
    let reg = Registry::new();
    let c = requests(&reg);
    let labels = [("method", "GET"), ("handler", "/"), ("status", "200")];
    c.inc_by(&labels, 3);

    let first = reg.gather();
    let second = reg.gather();
    assert_eq!(first, second);
    assert_eq!(c.get(&labels), Some(3));
}

#[test]
fn unlabeled_family_exports_zero_series_at_registration() {
    let reg = Registry::new();
    reg.register_gauge(MetricDescriptor::gauge("t_idle", "g", &[]))
        .unwrap();
    let h = reg
        .register_histogram(MetricDescriptor::histogram("t_idle_seconds", "h", &[], &[1.0]))
        .unwrap();
    requests(&reg);

    let snap = reg.gather();
    assert_eq!(snap[0].series.len(), 1);
    assert_eq!(snap[0].series[0].value, SampleValue::Gauge(0));
    let hist = h.get(&[]).unwrap();
    assert_eq!((hist.count, hist.buckets.clone()), (0, vec![(1.0, 0)]));
    // labeled families still wait for their first observation
    assert!(snap[2].series.is_empty());
}

#[test]
fn non_finite_samples_are_dropped() {
    let reg = Registry::new();
    let h = reg
        .register_histogram(MetricDescriptor::histogram(
            "t_lat_seconds",
            "h",
            &["op"],
            &DEFAULT_BUCKETS,
        ))
        .unwrap();

    let err = h.try_observe(&[("op", "search")], f64::NAN).expect_err("NaN");
    assert_eq!(err.code().as_str(), "INVALID_SAMPLE");

    h.observe(&[("op", "search")], f64::INFINITY);
    assert_eq!(reg.dropped_observations(), 1);
    assert!(h.get(&[("op", "search")]).is_none());

    h.observe(&[("op", "search")], 0.2);
    let snap = h.get(&[("op", "search")]).unwrap();
    assert_eq!(snap.count, 1);
    assert!(snap.sum.is_finite());
}

#[cfg(not(debug_assertions))]
#[test]
fn label_mismatch_is_dropped_in_release_builds() {
    let reg = Registry::new();
    let c = requests(&reg);
    c.inc(&[("method", "GET")]);
    c.inc(&[("method", "GET"), ("route", "/x"), ("status", "200")]);

    assert_eq!(reg.dropped_observations(), 2);
    assert!(reg.gather()[0].series.is_empty());
}

#[test]
fn contains_reports_registered_names() {
    let reg = Registry::new();
    assert!(!reg.contains("t_requests_total"));
    requests(&reg);
    assert!(reg.contains("t_requests_total"));
    assert_eq!(reg.dropped_observations(), 0);
}
