//! `idea_update` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use serde::Deserialize;
use tracing::{info_span, Instrument};

use super::util::{finish, not_found, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::models::UpdateIdeaRequest;
use crate::persistence::DocumentStore;
use crate::render::format_idea;
use crate::{AppError, AppState, Result};

/// Input parameters for `idea_update`.
#[derive(Debug, Deserialize)]
pub struct UpdateInput {
    /// Idea to change.
    pub idea_id: String,
    /// Fields to change.
    #[serde(flatten)]
    pub changes: UpdateIdeaRequest,
}

/// Apply a partial update.
///
/// # Errors
///
/// Returns validation, conflict, or store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>, input: UpdateInput) -> Result<String> {
    match state.service.update(&input.idea_id, input.changes).await {
        Ok(idea) => {
            let text = format_idea(&idea, false, "");
            Ok(format!("Updated idea {}\n{text}", idea.id))
        }
        Err(AppError::NotFound(_)) => Ok(not_found(&input.idea_id)),
        Err(err) => Err(err),
    }
}

/// Handle the `idea_update` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: UpdateInput = parse_arguments(context.arguments, "idea_update")?;
    let span = info_span!("idea_update", idea_id = %input.idea_id);
    finish(run(&state, input).instrument(span).await)
}
