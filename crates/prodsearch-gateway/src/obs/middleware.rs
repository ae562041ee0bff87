//! Request instrumentation middleware.
//!
//! Apply with `Router::layer` so the matched route pattern is visible in the
//! request extensions. Recording happens in the `Drop` of
//! [`RequestObservation`], which makes it run exactly once whether the
//! handler returns, panics, or its future is dropped mid-flight (client gone).
//! Anything that does not reach a response is recorded as 500.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;

use crate::obs::SearchMetrics;

/// `handler` label for requests that matched no declared route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

pub async fn track_http(
    State(metrics): State<Arc<SearchMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());
    let mut obs = RequestObservation::start(metrics, req.method().as_str().to_owned(), route);

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(res) => {
            obs.set_status(res.status());
            res
        }
        Err(panic) => {
            // record before the panic leaves this frame
            drop(obs);
            std::panic::resume_unwind(panic)
        }
    }
}

/// Drop guard that records one inbound request.
pub struct RequestObservation {
    metrics: Arc<SearchMetrics>,
    method: String,
    route: String,
    status: StatusCode,
    start: Instant,
}

impl RequestObservation {
    pub fn start(metrics: Arc<SearchMetrics>, method: String, route: String) -> Self {
        tracing::debug!(%method, %route, "request started");
        Self {
            metrics,
            method,
            route,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            start: Instant::now(),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }
}

impl Drop for RequestObservation {
    fn drop(&mut self) {
        let secs = self.start.elapsed().as_secs_f64();
        tracing::debug!(
            method = %self.method,
            route = %self.route,
            status = self.status.as_u16(),
            duration_secs = secs,
            "request completed"
        );
        self.metrics
            .record_http_request(&self.method, &self.route, self.status.as_u16(), secs);
    }
}
