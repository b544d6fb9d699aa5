//! `idea_next_actions` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use serde::Deserialize;
use tracing::{info_span, Instrument};

use super::util::{finish, ideas_text, parse_arguments};
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::{AppState, Result};

/// Input parameters for `idea_next_actions`.
#[derive(Debug, Default, Deserialize)]
pub struct NextActionsInput {
    /// Maximum number of actions; `config.next_limit` when omitted.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Todo ideas, most important first.
///
/// # Errors
///
/// Returns store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>, input: NextActionsInput) -> Result<String> {
    let limit = input.limit.unwrap_or(state.config.next_limit);
    let ideas = state.service.next_actions(limit).await?;
    if ideas.is_empty() {
        return Ok("No pending actions found".to_owned());
    }
    Ok(ideas_text(&format!("Next {} action(s):", ideas.len()), &ideas))
}

/// Handle the `idea_next_actions` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the arguments are malformed.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: NextActionsInput = parse_arguments(context.arguments, "idea_next_actions")?;
    let span = info_span!("idea_next_actions");
    finish(run(&state, input).instrument(span).await)
}
