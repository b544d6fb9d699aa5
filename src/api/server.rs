//! HTTP server hosting the REST API, `/health`, and the MCP streamable
//! HTTP transport on `/mcp`.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::routes::routes;
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::{AppError, AppState, Result};

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "idea-capture";

/// Handler for `GET /health`.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// Full application router.
///
/// Each MCP session on `/mcp` gets its own [`IdeaServer`] sharing `state`.
#[must_use]
pub fn app<S: DocumentStore>(state: Arc<AppState<S>>) -> Router {
    let prefix = state.config.http.api_prefix.clone();

    let mcp_state = Arc::clone(&state);
    let mcp = StreamableHttpService::new(
        move || Ok(IdeaServer::new(Arc::clone(&mcp_state))),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest(&prefix, routes::<S>())
        .nest_service("/mcp", mcp)
        .with_state(state)
}

/// Bind `config.http` and serve until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the address cannot be bound.
pub async fn serve_http<S: DocumentStore>(
    state: Arc<AppState<S>>,
    ct: CancellationToken,
) -> Result<()> {
    let bind = format!("{}:{}", state.config.http.host, state.config.http.port);
    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind HTTP on {bind}: {err}")))?;
    serve_on(listener, state, ct).await
}

/// Serve on an already-bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails.
pub async fn serve_on<S: DocumentStore>(
    listener: TcpListener,
    state: Arc<AppState<S>>,
    ct: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    let prefix = state.config.http.api_prefix.clone();
    info!(%addr, %prefix, "starting HTTP server");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("HTTP server error: {err}")))?;

    info!("HTTP server shut down");
    Ok(())
}
