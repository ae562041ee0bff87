//! Route checks performed before handing paths to axum.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use axum::routing::get;

use prodsearch_gateway::app_state::AppState;
use prodsearch_gateway::config::{self, GatewayConfig};
use prodsearch_gateway::router::{build_router, ApiRoutes};

async fn ok() -> &'static str {
    "ok"
}

fn state() -> AppState {
    AppState::new(GatewayConfig::default()).unwrap()
}

fn conflict(api: ApiRoutes) -> String {
    let err = build_router(state(), api).err().expect("must be rejected");
    assert_eq!(err.code().as_str(), "ROUTE_CONFLICT");
    err.to_string()
}

#[test]
fn api_route_on_metrics_path_is_an_error() {
    let msg = conflict(ApiRoutes::new().route("/metrics", get(ok)));
    assert!(msg.contains("/metrics"), "{msg}");
}

#[test]
fn api_route_on_custom_metrics_path_is_an_error() {
    let cfg = config::load_from_str("version: 1\nmetrics:\n  path: \"/stats\"\n").unwrap();
    let state = AppState::new(cfg).unwrap();
    let err = build_router(state, ApiRoutes::new().route("/stats", get(ok)))
        .err()
        .expect("must be rejected");
    assert_eq!(err.code().as_str(), "ROUTE_CONFLICT");
}

#[test]
fn overlapping_api_routes_are_an_error() {
    conflict(ApiRoutes::new().route("/search", get(ok)).route("/search", get(ok)));
    conflict(
        ApiRoutes::new()
            .route("/items/:id", get(ok))
            .route("/items/:sku", get(ok)),
    );
    conflict(ApiRoutes::new().route("/healthz", get(ok)));
}

#[test]
fn malformed_api_paths_are_an_error() {
    for path in ["search", "/items/:", "/files/*", "/a//b", "/a/*rest/b", "/x:y"] {
        conflict(ApiRoutes::new().route(path, get(ok)));
    }
}

#[test]
fn distinct_routes_are_accepted() {
    let api = ApiRoutes::new()
        .route("/search", get(ok))
        .route("/search/", get(ok))
        .route("/items/:id", get(ok))
        .route("/items/:id/reviews", get(ok))
        .route("/files/*path", get(ok));
    assert!(build_router(state(), api).is_ok());
}
