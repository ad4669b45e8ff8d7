//! metricpush gateway
//!
//! - WebSocket endpoint (default `/v1/ws`) streaming a synthetic `metrics`
//!   event to each client once per interval
//! - Ops endpoints: `/healthz`, `/readyz`, `/metrics`
//! - Graceful shutdown on Ctrl-C / SIGTERM stops every session

use tracing_subscriber::{fmt, EnvFilter};

use metricpush_core::error::{MetricPushError, Result};
use metricpush_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cfg = config::load()?;
    let listen = cfg.gateway.listen_addr()?;
    let ws_path = cfg.gateway.ws_path.clone();

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MetricPushError::Internal(format!("failed to bind {listen}: {e}")))?;
    tracing::info!(%listen, %ws_path, "metricpush-gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| MetricPushError::Internal(format!("server failed: {e}")))?;

    tracing::info!("metricpush-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
    state.begin_drain();
}
