//! Execution of parsed `idea` subcommands.

use std::io::{BufRead, Write};

use tracing::debug;

use super::Command;
use crate::config::GlobalConfig;
use crate::models::metadata::parse_metadata_json;
use crate::models::{CreateIdeaRequest, Idea, UpdateIdeaRequest};
use crate::persistence::DocumentStore;
use crate::query::ListQuery;
use crate::render::{format_idea, format_stats, format_tag_counts};
use crate::{AppError, IdeaService, Result};

const INDENT: &str = "   ";

/// Run `command`, writing human-readable output to `out`.
///
/// `input` is read only by the delete confirmation prompt.
///
/// # Errors
///
/// Returns the first validation, lookup, or store failure; "not found" on
/// `get`, `update`, and `delete` is an error.
pub async fn execute<S, W, R>(
    command: Command,
    service: &IdeaService<S>,
    config: &GlobalConfig,
    out: &mut W,
    input: &mut R,
) -> Result<()>
where
    S: DocumentStore,
    W: Write,
    R: BufRead,
{
    debug!(?command, "executing command");
    match command {
        Command::Add {
            content,
            tags,
            priority,
            status,
            metadata,
        } => {
            let metadata = metadata
                .as_deref()
                .map(parse_metadata_json)
                .transpose()?
                .unwrap_or_default();
            let request = CreateIdeaRequest {
                tags,
                priority,
                status,
                metadata,
                ..CreateIdeaRequest::new(content)
            };
            let idea = service.create(request).await?;
            writeln!(out, "Created idea: {}", idea.id)?;
            write_idea(out, &idea, false)?;
        }

        Command::List {
            status,
            priority,
            tag,
            limit,
            skip,
        } => {
            let query = ListQuery {
                status,
                priority,
                tag,
                limit,
                skip,
            };
            let ideas = service.list(&query).await?;
            if ideas.is_empty() {
                writeln!(out, "No ideas found")?;
            } else {
                write_ideas(out, &ideas)?;
            }
        }

        Command::Get { id } => {
            let idea = service.require(&id).await?;
            write_idea(out, &idea, true)?;
        }

        Command::Update {
            id,
            content,
            tags,
            add_tags,
            priority,
            status,
        } => {
            let request = UpdateIdeaRequest {
                content,
                tags: (!tags.is_empty()).then_some(tags),
                add_tags,
                priority,
                status,
                ..UpdateIdeaRequest::default()
            };
            let idea = service.update(&id, request).await?;
            writeln!(out, "Updated idea: {}", idea.id)?;
            write_idea(out, &idea, false)?;
        }

        Command::Delete { id, yes } => {
            let idea = service.require(&id).await?;
            if !yes && !confirm(out, input, "Are you sure you want to delete this idea?")? {
                writeln!(out, "Aborted.")?;
                return Ok(());
            }
            let revision = idea
                .revision
                .ok_or_else(|| AppError::Transport(format!("idea {id} has no revision")))?;
            service.delete_with_revision(&id, &revision).await?;
            writeln!(out, "Deleted idea: {id}")?;
        }

        Command::Next { limit } => {
            let limit = limit.unwrap_or(config.next_limit);
            let ideas = service.next_actions(limit).await?;
            if ideas.is_empty() {
                writeln!(out, "No pending actions found")?;
            } else {
                writeln!(out, "Next {} action(s):\n", ideas.len())?;
                write_ideas(out, &ideas)?;
            }
        }

        Command::Tags => {
            let counts = service.tag_counts().await?;
            writeln!(out, "{}", format_tag_counts(&counts))?;
        }

        Command::Stats => {
            let stats = service.stats().await?;
            writeln!(out, "{}", format_stats(&stats))?;
        }

        Command::Setup => {
            writeln!(out, "Setting up database...")?;
            service.store().ensure_database().await?;
            writeln!(out, "Database '{}' is ready", config.store.database)?;
            writeln!(out, "Installing design documents...")?;
            service.store().install_indexes().await?;
            writeln!(out, "Design documents installed")?;
            writeln!(out, "\nSetup complete!")?;
        }

        Command::Doctor => doctor(service, config, out).await?,
    }
    Ok(())
}

fn write_idea<W: Write>(out: &mut W, idea: &Idea, detailed: bool) -> Result<()> {
    writeln!(out, "{}", format_idea(idea, detailed, INDENT))?;
    Ok(())
}

fn write_ideas<W: Write>(out: &mut W, ideas: &[Idea]) -> Result<()> {
    for idea in ideas {
        write_idea(out, idea, false)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Ask a yes/no question; anything but `y`/`yes` declines.
fn confirm<W: Write, R: BufRead>(out: &mut W, input: &mut R, question: &str) -> Result<bool> {
    write!(out, "{question} [y/N]: ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Step-by-step connection check; stops at the first failing step.
async fn doctor<S: DocumentStore, W: Write>(
    service: &IdeaService<S>,
    config: &GlobalConfig,
    out: &mut W,
) -> Result<()> {
    let store = &config.store;
    writeln!(out, "Testing Idea Capture Configuration...\n")?;

    writeln!(out, "1. Checking configuration...")?;
    writeln!(out, "{INDENT}✓ Configuration loaded")?;
    writeln!(out, "{INDENT}- URL: {}", store.url)?;
    writeln!(out, "{INDENT}- Database: {}", store.database)?;
    writeln!(
        out,
        "{INDENT}- Username: {}",
        store.username.as_deref().unwrap_or("(none)")
    )?;

    writeln!(out, "\n2. Testing CouchDB server connection...")?;
    let status = match service.diagnose().await {
        Ok(status) => status,
        Err(err) => {
            writeln!(out, "{INDENT}✗ Connection failed: {err}")?;
            writeln!(out, "\n{INDENT}Troubleshooting:")?;
            writeln!(
                out,
                "{INDENT}- Is CouchDB running? Try: curl {}/",
                store.url
            )?;
            writeln!(out, "{INDENT}- Check COUCHDB_URL in .env file")?;
            return Err(err);
        }
    };
    writeln!(out, "{INDENT}✓ Connected to CouchDB")?;
    writeln!(
        out,
        "{INDENT}- Version: {}",
        status.version.as_deref().unwrap_or("unknown")
    )?;
    writeln!(out, "{INDENT}- Vendor: {}", status.vendor)?;

    writeln!(out, "\n3. Testing authentication...")?;
    let Some(user) = status.user.as_deref() else {
        writeln!(out, "{INDENT}✗ Not authenticated (anonymous access)")?;
        writeln!(out, "\n{INDENT}Troubleshooting:")?;
        writeln!(
            out,
            "{INDENT}- Check COUCHDB_USERNAME and COUCHDB_PASSWORD in .env"
        )?;
        return Err(AppError::Config("not authenticated".into()));
    };
    writeln!(out, "{INDENT}✓ Authenticated as: {user}")?;

    writeln!(out, "\n4. Checking database...")?;
    if !status.database_exists {
        writeln!(
            out,
            "{INDENT}⚠ Database '{}' does not exist",
            store.database
        )?;
        writeln!(out, "{INDENT}- Run: idea setup")?;
        return Err(AppError::NotFound(format!("database '{}'", store.database)));
    }
    writeln!(out, "{INDENT}✓ Database '{}' exists", store.database)?;
    if let Some(count) = status.doc_count {
        writeln!(out, "{INDENT}- Documents: {count}")?;
    }

    writeln!(out, "\n5. Checking design documents...")?;
    if !status.indexes_installed {
        writeln!(out, "{INDENT}⚠ Design documents not installed")?;
        writeln!(out, "{INDENT}- Run: idea setup")?;
        return Err(AppError::NotFound("design document".into()));
    }
    writeln!(out, "{INDENT}✓ Design documents installed")?;

    writeln!(out, "\n✓ All checks passed!")?;
    writeln!(out, "\nTry:")?;
    writeln!(out, "  idea add \"My first idea\"")?;
    writeln!(out, "  idea list")?;
    writeln!(out, "  idea next")?;
    Ok(())
}
