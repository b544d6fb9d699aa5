//! Shared utilities for MCP tool handlers.

use rmcp::model::{CallToolResult, Content, JsonObject};
use rmcp::ErrorData;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::Idea;
use crate::render::format_idea;
use crate::Result;

/// Deserialize tool arguments into a typed input.
///
/// # Errors
///
/// Returns `invalid_params` when the arguments do not match the schema.
pub fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
    tool: &str,
) -> std::result::Result<T, ErrorData> {
    let args = arguments.unwrap_or_default();
    serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
        ErrorData::invalid_params(format!("invalid {tool} arguments: {err}"), None)
    })
}

/// Turn a tool outcome into a call result; domain failures become
/// error results rather than protocol errors.
///
/// # Errors
///
/// Never fails; the `Result` matches the tool route signature.
pub fn finish(outcome: Result<String>) -> std::result::Result<CallToolResult, ErrorData> {
    match outcome {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(err) => {
            warn!(%err, "tool call failed");
            Ok(CallToolResult::error(vec![Content::text(format!("Error: {err}"))]))
        }
    }
}

/// `header` followed by each idea and a blank line.
#[must_use]
pub fn ideas_text(header: &str, ideas: &[Idea]) -> String {
    let mut text = format!("{header}\n\n");
    for idea in ideas {
        text.push_str(&format_idea(idea, false, ""));
        text.push_str("\n\n");
    }
    text
}

/// Text returned when an id does not resolve.
#[must_use]
pub fn not_found(id: &str) -> String {
    format!("Idea not found: {id}")
}
