//! MCP server handler and tool router.

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::{
    tool::{ToolCallContext, ToolRoute, ToolRouter},
    ServerHandler,
};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, JsonObject, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use serde_json::{json, Value};
use tracing::info_span;

use crate::models::{Priority, Status};
use crate::persistence::DocumentStore;
use crate::AppState;

/// Tool names in listing order.
pub const TOOL_NAMES: [&str; 8] = [
    "idea_add",
    "idea_list",
    "idea_get",
    "idea_update",
    "idea_delete",
    "idea_next_actions",
    "idea_search_by_tag",
    "idea_tags",
];

/// Earlier tool names still accepted by `call_tool`, with their current names.
///
/// Aliases are routed but not advertised by `list_tools`.
pub const TOOL_ALIASES: [(&str, &str); 1] = [("idea_search_by_tags", "idea_search_by_tag")];

/// Current tool name for an alias in [`TOOL_ALIASES`].
#[must_use]
pub fn resolve_alias(name: &str) -> Option<&'static str> {
    TOOL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
}

/// MCP server exposing the idea tools over a shared [`AppState`].
pub struct IdeaServer<S> {
    state: Arc<AppState<S>>,
}

impl<S: DocumentStore> IdeaServer<S> {
    /// Create a new MCP server bound to shared application state.
    #[must_use]
    pub fn new(state: Arc<AppState<S>>) -> Self {
        Self { state }
    }

    /// Access the shared application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState<S>> {
        &self.state
    }

    fn tool_router() -> ToolRouter<Self> {
        use crate::mcp::tools;

        let mut router = ToolRouter::new();

        for tool in all_tools() {
            let name = tool.name.to_string();
            let route = match name.as_str() {
                "idea_add" => {
                    ToolRoute::new_dyn(tool, |context| Box::pin(tools::add::handle::<S>(context)))
                }
                "idea_list" => {
                    ToolRoute::new_dyn(tool, |context| Box::pin(tools::list::handle::<S>(context)))
                }
                "idea_get" => {
                    ToolRoute::new_dyn(tool, |context| Box::pin(tools::get::handle::<S>(context)))
                }
                "idea_update" => ToolRoute::new_dyn(tool, |context| {
                    Box::pin(tools::update::handle::<S>(context))
                }),
                "idea_delete" => ToolRoute::new_dyn(tool, |context| {
                    Box::pin(tools::delete::handle::<S>(context))
                }),
                "idea_next_actions" => ToolRoute::new_dyn(tool, |context| {
                    Box::pin(tools::next_actions::handle::<S>(context))
                }),
                "idea_search_by_tag" => ToolRoute::new_dyn(tool, |context| {
                    Box::pin(tools::search_by_tag::handle::<S>(context))
                }),
                "idea_tags" => {
                    ToolRoute::new_dyn(tool, |context| Box::pin(tools::tags::handle::<S>(context)))
                }
                _ => ToolRoute::new_dyn(tool, |_context| {
                    Box::pin(async {
                        Err(rmcp::ErrorData::internal_error("tool not implemented", None))
                    })
                }),
            };
            router.add_route(route);
        }

        router
    }
}

/// Convert a `serde_json::Value::Object` into the map expected by `Tool`.
fn schema(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::default()),
    }
}

fn status_values() -> Vec<&'static str> {
    Status::ALL.iter().map(|status| status.as_str()).collect()
}

fn priority_values() -> Vec<&'static str> {
    Priority::ALL
        .iter()
        .map(|priority| priority.as_str())
        .collect()
}

/// Every tool advertised by [`IdeaServer`], in [`TOOL_NAMES`] order.
#[must_use]
pub fn all_tools() -> Vec<Tool> {
    let statuses = status_values();
    let priorities = priority_values();
    let id_only = |what: &str| {
        schema(json!({
            "type": "object",
            "properties": {
                "idea_id": { "type": "string", "description": format!("The ID of the idea to {what}") }
            },
            "required": ["idea_id"]
        }))
    };

    vec![
        Tool::new(
            "idea_add",
            "Add a new idea to the capture system",
            schema(json!({
                "type": "object",
                "properties": {
                    "content": { "type": "string", "description": "The content of the idea" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "Tags for categorizing the idea", "default": [] },
                    "priority": { "type": "string", "enum": priorities, "description": "Priority level", "default": "medium" },
                    "status": { "type": "string", "enum": statuses, "description": "Current status", "default": "todo" },
                    "metadata": { "type": "object", "description": "Additional metadata", "default": {} },
                    "source": {
                        "type": "object",
                        "description": "Where the idea was captured",
                        "properties": {
                            "client": { "type": "string" },
                            "project": { "type": "string" },
                            "branch": { "type": "string" },
                            "files": { "type": "array", "items": { "type": "string" } },
                            "session_id": { "type": "string" }
                        },
                        "required": ["client"]
                    }
                },
                "required": ["content"]
            })),
        ),
        Tool::new(
            "idea_list",
            "List ideas with optional filtering",
            schema(json!({
                "type": "object",
                "properties": {
                    "status": { "type": "string", "enum": statuses, "description": "Filter by status" },
                    "priority": { "type": "string", "enum": priorities, "description": "Filter by priority" },
                    "tag": { "type": "string", "description": "Filter by tag" },
                    "limit": { "type": "integer", "minimum": 0, "description": "Maximum number of ideas to return", "default": 20 },
                    "skip": { "type": "integer", "minimum": 0, "description": "Ideas to skip when no filter is given", "default": 0 }
                }
            })),
        ),
        Tool::new("idea_get", "Get a specific idea by ID", id_only("retrieve")),
        Tool::new(
            "idea_update",
            "Update an existing idea",
            schema(json!({
                "type": "object",
                "properties": {
                    "idea_id": { "type": "string", "description": "The ID of the idea to update" },
                    "content": { "type": "string", "description": "New content" },
                    "tags": { "type": "array", "items": { "type": "string" }, "description": "New tags (replaces existing)" },
                    "add_tags": { "type": "array", "items": { "type": "string" }, "description": "Tags to add" },
                    "priority": { "type": "string", "enum": priorities, "description": "New priority" },
                    "status": { "type": "string", "enum": statuses, "description": "New status" },
                    "metadata": { "type": "object", "description": "Metadata keys to merge" }
                },
                "required": ["idea_id"]
            })),
        ),
        Tool::new("idea_delete", "Delete an idea", id_only("delete")),
        Tool::new(
            "idea_next_actions",
            "Get next actions (todo items sorted by priority)",
            schema(json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "minimum": 0, "description": "Maximum number of actions to return", "default": 5 }
                }
            })),
        ),
        Tool::new(
            "idea_search_by_tag",
            "Search ideas by tag",
            schema(json!({
                "type": "object",
                "properties": {
                    "tag": { "type": "string", "description": "Tag to search for" }
                },
                "required": ["tag"]
            })),
        ),
        Tool::new(
            "idea_tags",
            "List all tags with usage counts",
            schema(json!({ "type": "object", "properties": {} })),
        ),
    ]
}

impl<S: DocumentStore> ServerHandler for IdeaServer<S> {
    fn call_tool(
        &self,
        mut request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        if let Some(canonical) = resolve_alias(&request.name) {
            request.name = canonical.into();
        }
        let router = Self::tool_router();
        let _span = info_span!("call_tool", tool = %request.name).entered();

        async move {
            router
                .call(ToolCallContext::new(self, request, context))
                .await
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(all_tools())))
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Capture, organize, and retrieve ideas and next actions stored in CouchDB.".into(),
            ),
            ..ServerInfo::default()
        }
    }
}
