//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - `/metrics` : Prometheus text format (path is configurable)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use prodsearch_core::metrics::CONTENT_TYPE;

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

/// Snapshot the registry and serve it. Never reaches out to the search cluster.
pub async fn metrics(State(state): State<AppState>) -> Response {
    tracing::debug!("serving metrics snapshot");
    match state.metrics().render() {
        Ok(body) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, code = e.code().as_str(), "metrics exposition failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.code().as_str()).into_response()
        }
    }
}
