//! `idea_get` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use serde::Deserialize;
use tracing::{info_span, Instrument};

use super::util::{finish, not_found, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::render::format_idea;
use crate::{AppState, Result};

/// Input parameters for `idea_get`.
#[derive(Debug, Deserialize)]
pub struct GetInput {
    /// Idea to fetch.
    pub idea_id: String,
}

/// Detailed rendering of one idea, or a not-found message.
///
/// # Errors
///
/// Returns store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>, input: GetInput) -> Result<String> {
    Ok(match state.service.get(&input.idea_id).await? {
        Some(idea) => format_idea(&idea, true, ""),
        None => not_found(&input.idea_id),
    })
}

/// Handle the `idea_get` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: GetInput = parse_arguments(context.arguments, "idea_get")?;
    let span = info_span!("idea_get", idea_id = %input.idea_id);
    finish(run(&state, input).instrument(span).await)
}
