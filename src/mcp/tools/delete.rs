//! `idea_delete` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use serde::Deserialize;
use tracing::{info_span, Instrument};

use super::util::{finish, not_found, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::{AppError, AppState, Result};

/// Input parameters for `idea_delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteInput {
    /// Idea to delete.
    pub idea_id: String,
}

/// Delete an idea at its current revision.
///
/// # Errors
///
/// Returns conflict or store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>, input: DeleteInput) -> Result<String> {
    match state.service.delete(&input.idea_id).await {
        Ok(()) => Ok(format!("Deleted idea: {}", input.idea_id)),
        Err(AppError::NotFound(_)) => Ok(not_found(&input.idea_id)),
        Err(err) => Err(err),
    }
}

/// Handle the `idea_delete` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: DeleteInput = parse_arguments(context.arguments, "idea_delete")?;
    let span = info_span!("idea_delete", idea_id = %input.idea_id);
    finish(run(&state, input).instrument(span).await)
}
