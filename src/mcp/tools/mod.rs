//! MCP tool handlers.
//!
//! Each tool has a `run` function holding the behavior (callable from
//! tests without a transport) and a `handle` function adapting it to the
//! rmcp tool route.

pub mod add;
pub mod delete;
pub mod get;
pub mod list;
pub mod next_actions;
pub mod search_by_tag;
pub mod tags;
pub mod update;
pub mod util;
