//! Human-readable text rendering shared by the CLI and MCP tools.

use std::fmt::Write as _;

use crate::models::{Idea, Priority, Status};
use crate::query::{KeyCount, Stats};

/// Glyph shown before an idea in the given status.
#[must_use]
pub fn status_glyph(status: Status) -> &'static str {
    match status {
        Status::Inbox => "📥",
        Status::Todo => "☐",
        Status::InProgress => "⏳",
        Status::Done => "✓",
        Status::Archived => "📦",
    }
}

/// Glyph shown for the given priority.
#[must_use]
pub fn priority_glyph(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
    }
}

/// Truncate `text` to at most `max_chars` characters, ending in `...`
/// when anything was cut.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars < 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut truncated: String = text.chars().take(max_chars - 3).collect();
    truncated.push_str("...");
    truncated
}

/// `#a, #b` rendering of a tag list.
#[must_use]
pub fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Single display line: glyphs, content, and bracketed tags.
#[must_use]
pub fn display_line(idea: &Idea) -> String {
    let mut line = format!(
        "{} {} {}",
        status_glyph(idea.status),
        priority_glyph(idea.priority),
        idea.content
    );
    if !idea.tags.is_empty() {
        let _ = write!(line, " [{}]", tag_list(&idea.tags));
    }
    line
}

/// Multi-line rendering of one idea; every line after the first is
/// prefixed with `indent`.
#[must_use]
pub fn format_idea(idea: &Idea, detailed: bool, indent: &str) -> String {
    let mut out = format!(
        "{} {} {}\n{indent}ID: {}",
        status_glyph(idea.status),
        priority_glyph(idea.priority),
        idea.content,
        idea.id
    );
    if !idea.tags.is_empty() {
        let _ = write!(out, "\n{indent}Tags: {}", tag_list(&idea.tags));
    }
    if detailed {
        let _ = write!(
            out,
            "\n{indent}Status: {}\n{indent}Priority: {}\n{indent}Created: {}\n{indent}Updated: {}",
            idea.status,
            idea.priority,
            idea.created.to_rfc3339(),
            idea.updated.to_rfc3339()
        );
        if !idea.metadata.is_empty() {
            let metadata = serde_json::to_string_pretty(&idea.metadata).unwrap_or_default();
            let _ = write!(out, "\n{indent}Metadata: {metadata}");
        }
    }
    out
}

/// Ideas separated by blank lines, each ending with a newline.
#[must_use]
pub fn format_ideas(ideas: &[Idea], indent: &str) -> String {
    ideas
        .iter()
        .map(|idea| format!("{}\n", format_idea(idea, false, indent)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tag usage table.
#[must_use]
pub fn format_tag_counts(counts: &[KeyCount]) -> String {
    if counts.is_empty() {
        return "No tags found".to_owned();
    }
    let mut out = String::from("Tags (sorted by usage):\n");
    for entry in counts {
        let _ = write!(out, "\n  #{:<30} {} idea(s)", entry.key, entry.count);
    }
    out
}

/// Status and priority summary; zero rows are omitted.
#[must_use]
pub fn format_stats(stats: &Stats) -> String {
    let mut out = String::from("📊 Idea Statistics\n\nBy Status:");
    for entry in stats.by_status.iter().filter(|entry| entry.count > 0) {
        let _ = write!(
            out,
            "\n  {} {:<15} {}",
            status_glyph(entry.status),
            entry.status.as_str(),
            entry.count
        );
    }
    out.push_str("\n\nBy Priority:");
    for entry in stats.by_priority.iter().filter(|entry| entry.count > 0) {
        let _ = write!(
            out,
            "\n  {} {:<15} {}",
            priority_glyph(entry.priority),
            entry.priority.as_str(),
            entry.count
        );
    }
    let _ = write!(out, "\n\n🏷️  Total unique tags: {}", stats.unique_tags);
    out
}
