//! HTTP facade over the dialogue orchestrator.

mod handlers;

use crate::agent::DialogueOrchestrator;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Build the router: `/health`, `/chat`, `/history`, `/clear-history`.
/// Routed paths accept requests from any origin; unrouted paths stay 404.
pub fn router(agent: Arc<DialogueOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/history", get(handlers::history))
        .route("/clear-history", post(handlers::clear_history))
        .route_layer(CorsLayer::permissive())
        .with_state(agent)
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve(agent: Arc<DialogueOrchestrator>, bind: &str, shutdown: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("{} API listening on http://{}", agent.identity().name, listener.local_addr()?);

    axum::serve(listener, router(agent))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped");
    Ok(())
}
