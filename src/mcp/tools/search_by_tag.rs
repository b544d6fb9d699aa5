//! `idea_search_by_tag` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use serde::Deserialize;
use tracing::{info_span, Instrument};

use super::util::{finish, ideas_text, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::{AppState, Result};

/// Input parameters for `idea_search_by_tag`.
#[derive(Debug, Deserialize)]
pub struct SearchByTagInput {
    /// Tag to search for.
    pub tag: String,
}

/// Ideas carrying a tag.
///
/// # Errors
///
/// Returns store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>, input: SearchByTagInput) -> Result<String> {
    let ideas = state.service.search_by_tag(&input.tag, None).await?;
    if ideas.is_empty() {
        return Ok(format!("No ideas found with tag: {}", input.tag));
    }
    Ok(ideas_text(
        &format!("Found {} idea(s) with tag '{}':", ideas.len(), input.tag),
        &ideas,
    ))
}

/// Handle the `idea_search_by_tag` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: SearchByTagInput = parse_arguments(context.arguments, "idea_search_by_tag")?;
    let span = info_span!("idea_search_by_tag", tag = %input.tag);
    finish(run(&state, input).instrument(span).await)
}
