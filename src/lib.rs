#![forbid(unsafe_code)]

//! Personal idea capture backed by `CouchDB`.
//!
//! The crate is organized around a small index/query core
//! ([`index`], [`query`], [`service`]) over a pluggable
//! [`persistence::DocumentStore`], with three front ends: the `idea` CLI
//! ([`cli`]), a REST API ([`api`]), and MCP tools ([`mcp`]).

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod index;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod persistence;
pub mod query;
pub mod render;
pub mod service;
pub mod state;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use service::IdeaService;
pub use state::AppState;
