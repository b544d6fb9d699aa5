//! Stdio transport for MCP clients that spawn the server directly.

use std::sync::Arc;

use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::{AppError, AppState, Result};

/// Serve the MCP tools over stdin/stdout until the client disconnects or
/// the cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Mcp` if the transport fails to initialize or the
/// session ends with an error.
pub async fn serve_stdio<S: DocumentStore>(
    state: Arc<AppState<S>>,
    ct: CancellationToken,
) -> Result<()> {
    let server = IdeaServer::new(state);

    info!("starting stdio MCP transport");
    let service = server
        .serve_with_ct(stdio(), ct)
        .await
        .map_err(|err| AppError::Mcp(format!("stdio transport failed: {err}")))?;

    service
        .waiting()
        .await
        .map_err(|err| AppError::Mcp(format!("stdio service error: {err}")))?;

    info!("stdio MCP transport shut down");
    Ok(())
}
