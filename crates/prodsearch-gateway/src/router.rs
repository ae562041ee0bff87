//! Axum router wiring.
//!
//! Ops endpoints plus whatever API routes the caller supplies, all behind the
//! request instrumentation middleware. Paths are checked here so a bad or
//! overlapping route is a startup error instead of a panic inside axum.

use axum::{
    middleware,
    routing::{get, MethodRouter},
    Router,
};

use prodsearch_core::error::{ProdSearchError, Result};

use crate::{app_state::AppState, obs, ops};

/// API routes supplied by the service, kept with their paths until
/// [`build_router`] has checked them.
#[derive(Default)]
pub struct ApiRoutes {
    routes: Vec<(String, MethodRouter<AppState>)>,
}

impl ApiRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, method_router: MethodRouter<AppState>) -> Self {
        self.routes.push((path.to_string(), method_router));
        self
    }
}

pub fn build_router(state: AppState, api: ApiRoutes) -> Result<Router> {
    let metrics_path = state.cfg().metrics.path.clone();
    let ops_routes = [
        ("/healthz".to_string(), get(ops::healthz)),
        ("/readyz".to_string(), get(ops::readyz)),
        (metrics_path, get(ops::metrics)),
    ];

    let mut claimed: Vec<(String, String)> = Vec::new();
    let mut router = Router::new();
    for (path, method_router) in ops_routes.into_iter().chain(api.routes) {
        check_path(&path)?;
        let shape = route_shape(&path);
        if let Some((_, taken)) = claimed.iter().find(|(s, _)| *s == shape) {
            return Err(ProdSearchError::RouteConflict(format!(
                "{path} overlaps {taken}"
            )));
        }
        claimed.push((shape, path.clone()));
        router = router.route(&path, method_router);
    }

    Ok(router
        .layer(middleware::from_fn_with_state(
            state.metrics(),
            obs::middleware::track_http,
        ))
        .with_state(state))
}

/// Absolute path; `:name` and `*name` only as whole, named segments, `*` last;
/// no empty segments except a trailing slash.
fn check_path(path: &str) -> Result<()> {
    let bad = |why: &str| ProdSearchError::RouteConflict(format!("invalid route {path:?}: {why}"));

    let rest = path.strip_prefix('/').ok_or_else(|| bad("must start with '/'"))?;
    if rest.is_empty() {
        return Ok(());
    }
    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    for (i, &seg) in segments.iter().enumerate() {
        if seg.is_empty() {
            if i == last {
                continue;
            }
            return Err(bad("empty segment"));
        }
        let body = seg.strip_prefix([':', '*']).unwrap_or(seg);
        if body.contains([':', '*']) {
            return Err(bad("':' or '*' inside a segment"));
        }
        if body.len() == seg.len() {
            continue;
        }
        if body.is_empty() {
            return Err(bad("unnamed parameter"));
        }
        if seg.starts_with('*') && i != last {
            return Err(bad("wildcard must be the last segment"));
        }
    }
    Ok(())
}

/// Path with every parameter collapsed, so `/items/:id` and `/items/:sku` compare equal.
fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if seg.starts_with([':', '*']) {
                "{}"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
