//! `idea_add` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::{finish, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::models::CreateIdeaRequest;
use crate::persistence::DocumentStore;
use crate::render::format_idea;
use crate::{AppState, Result};

/// Capture a new idea.
///
/// # Errors
///
/// Returns validation or store failures.
pub async fn run<S: DocumentStore>(
    state: &AppState<S>,
    input: CreateIdeaRequest,
) -> Result<String> {
    let idea = state.service.create(input).await?;
    let text = format_idea(&idea, false, "");
    Ok(format!("Created idea {}\n{text}", idea.id))
}

/// Handle the `idea_add` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: CreateIdeaRequest = parse_arguments(context.arguments, "idea_add")?;
    finish(run(&state, input).instrument(info_span!("idea_add")).await)
}
