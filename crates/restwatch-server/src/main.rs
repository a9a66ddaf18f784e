//! restwatch server
//!
//! - Demo read-only endpoints: /users, /users/{id}, /error
//! - Access log + request count/duration metrics for every request
//! - Prometheus scrape endpoint: /metrics

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use restwatch_core::error::{Result, RestwatchError};
use restwatch_core::metrics::Registry;
use restwatch_server::{app_state::AppState, config, router};

const CONFIG_ENV: &str = "RESTWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "restwatch.yaml";

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "restwatch-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_or_default(&path)?;
    let listen = cfg.server.listen_addr()?;

    // one registry for the whole process, dropped on exit
    let registry = Arc::new(Registry::new());
    let state = AppState::new(cfg, registry)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "restwatch-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| RestwatchError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RestwatchError::Internal(format!("server failed: {e}")))?;

    tracing::info!("restwatch-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("shutdown signal received");
}
