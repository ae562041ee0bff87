//! Timing helpers for calls to the search cluster.
//!
//! The cluster client wraps each call in one of these; they only read the
//! clock and update the registry, so they never change the call's outcome.

use std::future::Future;
use std::time::{Duration, Instant};

use prodsearch_core::telemetry::{CallStatus, EsOperation};
use tokio::time::error::Elapsed;

use crate::obs::SearchMetrics;

/// Manual timer for call sites that cannot be expressed as a single future.
/// Nothing is recorded unless [`finish`](Self::finish) is called.
pub struct DependencyTimer<'a> {
    metrics: &'a SearchMetrics,
    op: EsOperation,
    start: Instant,
}

impl<'a> DependencyTimer<'a> {
    pub fn start(metrics: &'a SearchMetrics, op: EsOperation) -> Self {
        Self {
            metrics,
            op,
            start: Instant::now(),
        }
    }

    /// Record the call and return its duration in seconds.
    pub fn finish(self, status: CallStatus) -> f64 {
        let secs = self.start.elapsed().as_secs_f64();
        self.metrics.record_dependency_call(self.op, status, secs);
        secs
    }
}

/// Await `fut` and record it as `ok` or `error` from its result.
pub async fn track_call<F, T, E>(metrics: &SearchMetrics, op: EsOperation, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let timer = DependencyTimer::start(metrics, op);
    let res = fut.await;
    let secs = timer.finish(CallStatus::of(&res));
    if res.is_err() {
        tracing::debug!(op = %op, duration_secs = secs, "search cluster call failed");
    }
    res
}

/// Like [`track_call`], but gives up after `limit` and records `timeout`.
pub async fn track_call_with_timeout<F, T, E>(
    metrics: &SearchMetrics,
    op: EsOperation,
    limit: Duration,
    fut: F,
) -> Result<Result<T, E>, Elapsed>
where
    F: Future<Output = Result<T, E>>,
{
    let timer = DependencyTimer::start(metrics, op);
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => {
            timer.finish(CallStatus::of(&res));
            Ok(res)
        }
        Err(elapsed) => {
            let secs = timer.finish(CallStatus::Timeout);
            tracing::warn!(op = %op, duration_secs = secs, "search cluster call timed out");
            Err(elapsed)
        }
    }
}
