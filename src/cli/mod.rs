//! Argument model for the `idea` command-line tool.
//!
//! Parsing lives here so it can be exercised without spawning the binary;
//! [`commands::execute`] runs a parsed [`Command`] against an
//! [`crate::IdeaService`].

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;
use crate::models::{Priority, Status};

pub use commands::execute;

/// `idea` - capture and organize ideas in `CouchDB`.
#[derive(Debug, Parser)]
#[command(name = "idea", about = "Simple idea management with CouchDB", version, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Use an in-process store; nothing is persisted.
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `idea`.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Add a new idea.
    Add {
        /// Idea text.
        content: String,
        /// Tags for the idea (repeatable).
        #[arg(short = 't', long = "tags")]
        tags: Vec<String>,
        /// Priority level.
        #[arg(short, long, value_enum)]
        priority: Option<Priority>,
        /// Initial status.
        #[arg(short, long, value_enum)]
        status: Option<Status>,
        /// Additional metadata as a JSON object.
        #[arg(short, long)]
        metadata: Option<String>,
    },

    /// List ideas; filters combine (e.g. `--status todo --priority high`).
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by tag.
        #[arg(long)]
        tag: Option<String>,
        /// Maximum number of ideas to show.
        #[arg(short, long)]
        limit: Option<usize>,
        /// Ideas to skip (unfiltered listings only).
        #[arg(short, long, default_value_t = 0)]
        skip: usize,
    },

    /// Show one idea in detail.
    Get {
        /// Idea identifier.
        id: String,
    },

    /// Update an existing idea.
    Update {
        /// Idea identifier.
        id: String,
        /// New content.
        #[arg(short, long)]
        content: Option<String>,
        /// New tags, replacing the existing ones (repeatable).
        #[arg(short = 't', long = "tags")]
        tags: Vec<String>,
        /// Tags added to the existing ones (repeatable).
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
        /// New priority.
        #[arg(short, long, value_enum)]
        priority: Option<Priority>,
        /// New status.
        #[arg(short, long, value_enum)]
        status: Option<Status>,
    },

    /// Delete an idea.
    Delete {
        /// Idea identifier.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Next actions: todo items sorted by priority.
    Next {
        /// Maximum number of actions; defaults to `next_limit` from config.
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List all tags with usage counts.
    Tags,

    /// Show counts by status and priority.
    Stats,

    /// Create the database and install the design document.
    Setup,

    /// Check configuration, connectivity, credentials, and database state.
    Doctor,
}

impl Command {
    /// Whether the command only reads local configuration before talking
    /// to the store, so missing credentials should be reported by the
    /// command itself.
    #[must_use]
    pub fn reports_own_credentials(&self) -> bool {
        matches!(self, Self::Doctor)
    }
}
