//! Liveness probe
//!
//! Bare HTTP GET returning a static acknowledgement. Holds nothing but its
//! own config so a stuck market fetch can never block it.

use axum::{extract::State, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::config::HealthConfig;

/// Create the probe router
pub fn create_router(ack: &str) -> Router {
    let ack: Arc<str> = Arc::from(ack);
    Router::new()
        .route("/", get(acknowledge))
        .route("/health", get(acknowledge))
        .with_state(ack)
}

/// GET / and GET /health - static acknowledgement
async fn acknowledge(State(ack): State<Arc<str>>) -> String {
    ack.to_string()
}

/// Start the probe server on the configured port
pub async fn start_server(cfg: HealthConfig, shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("💓 Liveness probe listening on http://{}", addr);

    serve(listener, &cfg.ack, shutdown).await
}

/// Serve the probe on an already bound listener until shutdown is signalled
pub async fn serve(
    listener: TcpListener,
    ack: &str,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    axum::serve(listener, create_router(ack))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    tracing::info!("Liveness probe stopped");
    Ok(())
}
