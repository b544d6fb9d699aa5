#![forbid(unsafe_code)]

//! `idea-capture` - REST API and MCP server binary.
//!
//! Bootstraps configuration and the document store, then serves the REST
//! API and MCP streamable HTTP endpoint, the MCP stdio transport, or both.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use idea_capture::api::serve_http;
use idea_capture::logging::{init_tracing, load_dotenv, LogFormat};
use idea_capture::mcp::transport::serve_stdio;
use idea_capture::persistence::{CouchStore, DocumentStore, MemoryStore};
use idea_capture::{AppError, AppState, GlobalConfig, Result};

/// Which front ends to run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Transport {
    /// REST API plus MCP over streamable HTTP.
    Http,
    /// MCP over stdin/stdout only.
    Stdio,
    /// Both of the above.
    All,
}

#[derive(Debug, Parser)]
#[command(
    name = "idea-capture",
    about = "Idea capture REST and MCP server",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Front ends to serve.
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    transport: Transport,

    /// Use an in-process store; nothing is persisted.
    #[arg(long)]
    memory: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    load_dotenv();
    init_tracing(args.log_format, "info")?;
    info!("idea-capture server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::resolve(args.config.as_ref())?;
    config.load_credentials().await?;
    info!(url = %config.store.url, database = %config.store.database, "configuration loaded");

    if args.memory {
        warn!("using in-process memory store; data is lost at exit");
        return serve(AppState::new(config, MemoryStore::new()), args.transport).await;
    }

    config.store.ensure_credentials()?;
    let store = CouchStore::new(config.store.clone())?;
    let state = AppState::new(config, store);
    if let Err(err) = state.service.setup().await {
        warn!(%err, "database setup failed; requests will retry against the store");
    }
    serve(state, args.transport).await
}

async fn serve<S: DocumentStore>(state: AppState<S>, transport: Transport) -> Result<()> {
    let state = Arc::new(state);
    let ct = CancellationToken::new();

    let http_handle = matches!(transport, Transport::Http | Transport::All).then(|| {
        let http_ct = ct.clone();
        let http_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = serve_http(http_state, http_ct).await {
                error!(%err, "http transport failed");
            }
        })
    });

    let stdio_handle = matches!(transport, Transport::Stdio | Transport::All).then(|| {
        let stdio_ct = ct.clone();
        let stdio_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = serve_stdio(stdio_state, stdio_ct.clone()).await {
                error!(%err, "stdio transport failed");
            }
            // Stdio-only servers exit when the client disconnects.
            if transport == Transport::Stdio {
                stdio_ct.cancel();
            }
        })
    });

    info!(?transport, "server ready");

    tokio::select! {
        () = shutdown_signal() => info!("shutdown signal received"),
        () = ct.cancelled() => info!("transport closed"),
    }
    ct.cancel();

    for handle in [http_handle, stdio_handle].into_iter().flatten() {
        let _ = handle.await;
    }
    info!("idea-capture shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}
