//! prodsearch gateway binary.
//!
//! Loads config, registers metrics (fatal on conflict), serves the ops
//! endpoints, and drains on Ctrl-C / SIGTERM.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use prodsearch_core::error::{ProdSearchError, Result};
use prodsearch_gateway::app_state::AppState;
use prodsearch_gateway::config;
use prodsearch_gateway::router::{self, ApiRoutes};

const DEFAULT_CONFIG: &str = "prodsearch.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, code = e.code().as_str(), "prodsearch-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PRODSEARCH_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone(), ApiRoutes::new())?;

    tracing::info!(%listen, config = %path, "prodsearch-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ProdSearchError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| ProdSearchError::Internal(format!("server failed: {e}")))?;

    tracing::info!("prodsearch-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.set_draining();
    tracing::info!("shutdown signal received, draining");
}
