//! `idea_tags` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::finish;
use crate::mcp::handler::IdeaServer;
use crate::persistence::DocumentStore;
use crate::render::format_tag_counts;
use crate::{AppState, Result};

/// Tag usage table.
///
/// # Errors
///
/// Returns store failures.
pub async fn run<S: DocumentStore>(state: &AppState<S>) -> Result<String> {
    Ok(format_tag_counts(&state.service.tag_counts().await?))
}

/// Handle the `idea_tags` tool call.
///
/// # Errors
///
/// Never fails; the `Result` matches the tool route signature.
pub async fn handle<S: DocumentStore>(
    context: ToolCallContext<'_, IdeaServer<S>>,
) -> std::result::Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    finish(run(&state).instrument(info_span!("idea_tags")).await)
}
