//! Tracing subscriber setup shared by both binaries.
//!
//! Logs always go to stderr: stdout carries CLI output and the MCP stdio
//! transport.

use std::io;

use clap::ValueEnum;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{AppError, Result};

/// Log output format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Install the global subscriber; `RUST_LOG` overrides `default_level`.
///
/// # Errors
///
/// Returns `AppError::Config` if a global subscriber is already set.
pub fn init_tracing(log_format: LogFormat, default_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}

/// Load `.env` from the working directory, then from the home directory.
///
/// Variables already set in the process environment win.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
    if let Some(home) = std::env::var_os("HOME") {
        let _ = dotenvy::from_path(std::path::Path::new(&home).join(".env"));
    }
}
