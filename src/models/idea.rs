//! Idea document model and its enumerations.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deserialize_timestamp;
use super::metadata::Metadata;
use crate::{AppError, Result};

/// Relative importance of an idea.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Do first.
    High,
    /// Default importance.
    #[default]
    Medium,
    /// Whenever there is time.
    Low,
}

impl Priority {
    /// All priorities in display order (most important first).
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Sort rank used by the next-actions index (1 is most important).
    #[must_use]
    pub fn rank(self) -> u64 {
        crate::index::priority_rank(self.as_str())
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(AppError::Validation(format!(
                "invalid priority '{other}' (expected high, medium, or low)"
            ))),
        }
    }
}

/// Lifecycle state of an idea.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Captured but not yet triaged.
    Inbox,
    /// Actionable and waiting.
    #[default]
    Todo,
    /// Being worked on.
    #[serde(alias = "doing")]
    #[value(alias = "doing")]
    InProgress,
    /// Finished.
    Done,
    /// Kept for reference only.
    Archived,
}

impl Status {
    /// All statuses in the fixed reporting order.
    pub const ALL: [Self; 5] = [
        Self::Inbox,
        Self::Todo,
        Self::InProgress,
        Self::Done,
        Self::Archived,
    ];

    /// Wire value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Archived => "archived",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "todo" => Ok(Self::Todo),
            "in-progress" | "doing" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "archived" => Ok(Self::Archived),
            other => Err(AppError::Validation(format!(
                "invalid status '{other}' (expected inbox, todo, in-progress, done, or archived)"
            ))),
        }
    }
}

/// Document type discriminator stored in the `type` field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocKind {
    /// The only document kind this store writes.
    #[default]
    Idea,
}

/// Idea document persisted in `CouchDB`.
///
/// Field names on the wire follow `CouchDB` conventions (`_id`, `_rev`,
/// `type`) so stored documents can be read by the JavaScript views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Idea {
    /// Document identifier; a v4 UUID for ideas created here.
    #[serde(rename = "_id")]
    pub id: String,
    /// Opaque revision token; absent until the first write.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Type discriminator, always `idea`.
    #[serde(rename = "type", default)]
    pub kind: DocKind,
    /// Free text body.
    pub content: String,
    /// Distinct tags in the order they were first given.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Relative importance.
    #[serde(default)]
    pub priority: Priority,
    /// Lifecycle state.
    #[serde(default)]
    pub status: Status,
    /// Open key/value map; the `source` key records capture provenance.
    #[serde(default)]
    pub metadata: Metadata,
    /// Creation timestamp (UTC).
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    /// Last modification timestamp (UTC).
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub updated: DateTime<Utc>,
}

impl Idea {
    /// Construct an unsaved idea with a fresh identifier and default
    /// priority and status.
    ///
    /// No validation is performed; see [`super::CreateIdeaRequest`].
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            revision: None,
            kind: DocKind::Idea,
            content: content.into(),
            tags: Vec::new(),
            priority: Priority::default(),
            status: Status::default(),
            metadata: Metadata::new(),
            created: now,
            updated: now,
        }
    }

    /// Serialize to a `CouchDB` JSON document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a metadata value cannot be encoded.
    pub fn to_document(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|err| AppError::Validation(format!("cannot encode idea {}: {err}", self.id)))
    }

    /// Deserialize from a `CouchDB` JSON document.
    ///
    /// Missing optional fields take their defaults; missing timestamps are
    /// set to now.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the document is not a valid idea.
    pub fn from_document(document: serde_json::Value) -> Result<Self> {
        serde_json::from_value(document)
            .map_err(|err| AppError::Transport(format!("malformed idea document: {err}")))
    }

    /// Merge tags, keeping the first occurrence of each.
    pub fn add_tags<I>(&mut self, tags: I)
    where
        I: IntoIterator<Item = String>,
    {
        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }

    /// Mark the idea as modified now.
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}
