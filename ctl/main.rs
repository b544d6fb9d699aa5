#![forbid(unsafe_code)]

//! `idea` - command-line front end for idea capture.
//!
//! Talks to `CouchDB` directly through the library; no server is needed.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use idea_capture::cli::{execute, Cli};
use idea_capture::logging::{init_tracing, load_dotenv};
use idea_capture::persistence::{CouchStore, DocumentStore, MemoryStore};
use idea_capture::{AppError, GlobalConfig, IdeaService, Result};

fn main() -> ExitCode {
    let args = Cli::parse();
    load_dotenv();
    if let Err(err) = init_tracing(args.log_format, "warn") {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))
        .and_then(|runtime| runtime.block_on(run(args)));

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = io::stdout().flush();
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::resolve(args.config.as_ref())?;
    config.load_credentials().await?;

    if args.memory {
        return run_with(args, config, MemoryStore::new()).await;
    }
    if !args.command.reports_own_credentials() {
        config.store.ensure_credentials()?;
    }
    let store = CouchStore::new(config.store.clone())?;
    run_with(args, config, store).await
}

async fn run_with<S: DocumentStore>(args: Cli, config: GlobalConfig, store: S) -> Result<()> {
    let service = IdeaService::new(store);
    let stdout = io::stdout();
    let stdin = io::stdin();
    execute(
        args.command,
        &service,
        &config,
        &mut stdout.lock(),
        &mut stdin.lock(),
    )
    .await
}
