//! `idea_list` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::{finish, ideas_text, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::query::ListQuery;
use crate::{AppState, Result};

/// List ideas; the limit defaults to `config.list_limit`.
///
/// # Errors
///
/// Returns store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>, mut input: ListQuery) -> Result<String> {
    input.limit = Some(input.limit.unwrap_or(state.config.list_limit));
    let ideas = state.service.list(&input).await?;
    if ideas.is_empty() {
        return Ok("No ideas found".to_owned());
    }
    Ok(ideas_text(&format!("Found {} idea(s):", ideas.len()), &ideas))
}

/// Handle the `idea_list` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: ListQuery = parse_arguments(context.arguments, "idea_list")?;
    let span = info_span!("idea_list", plan = %state.service.explain(&input).describe());
    finish(run(&state, input).instrument(span).await)
}
