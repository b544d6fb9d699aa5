//! REST API and HTTP server.

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{app, serve_http, serve_on};
