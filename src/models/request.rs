//! Create and update request models plus their validation rules.
//!
//! All three front ends (CLI, REST, MCP) build one of these requests and
//! hand it to the service; nothing reaches the store before `validate`.

use serde::{Deserialize, Serialize};

use super::idea::{Idea, Priority, Status};
use super::metadata::{Metadata, MetadataValue};
use crate::{AppError, Result};

/// Maximum idea content length in characters.
pub const MAX_CONTENT_CHARS: usize = 10_000;

/// Maximum tag length in characters.
pub const MAX_TAG_CHARS: usize = 64;

/// Metadata key holding [`SourceInfo`].
pub const SOURCE_METADATA_KEY: &str = "source";

/// Provenance of a captured idea (which client, project, and files).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceInfo {
    /// Capturing client, e.g. `cli`, `claude-code`, `cursor`.
    pub client: String,
    /// Project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Version-control branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Related file paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Agent session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl SourceInfo {
    /// Encode as a metadata value for storage under [`SOURCE_METADATA_KEY`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if encoding fails.
    pub fn to_metadata_value(&self) -> Result<MetadataValue> {
        let value = serde_json::to_value(self)
            .map_err(|err| AppError::Validation(format!("cannot encode source: {err}")))?;
        MetadataValue::from_json(value)
    }
}

/// Request to capture a new idea.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateIdeaRequest {
    /// Free text body.
    pub content: String,
    /// Tags to attach.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Priority; medium when omitted.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Status; todo when omitted.
    #[serde(default)]
    pub status: Option<Status>,
    /// Arbitrary metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Capture provenance, stored in metadata.
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

impl CreateIdeaRequest {
    /// Request with only content set.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Validate and build an unsaved [`Idea`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for bad content or tags.
    pub fn into_idea(self) -> Result<Idea> {
        validate_content(&self.content)?;
        let tags = normalize_tags(self.tags)?;

        let mut idea = Idea::new(self.content);
        idea.tags = tags;
        idea.priority = self.priority.unwrap_or_default();
        idea.status = self.status.unwrap_or_default();
        idea.metadata = self.metadata;
        if let Some(source) = self.source {
            idea.metadata
                .insert(SOURCE_METADATA_KEY.to_owned(), source.to_metadata_value()?);
        }
        Ok(idea)
    }
}

/// Partial update; every absent field is left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateIdeaRequest {
    /// Replacement content.
    #[serde(default)]
    pub content: Option<String>,
    /// Replacement tag list.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Tags merged into the (possibly replaced) list.
    #[serde(default)]
    pub add_tags: Vec<String>,
    /// New priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// New status.
    #[serde(default)]
    pub status: Option<Status>,
    /// Metadata entries merged key by key.
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// Replacement capture provenance.
    #[serde(default)]
    pub source: Option<SourceInfo>,
}

impl UpdateIdeaRequest {
    /// Whether the request changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.tags.is_none()
            && self.add_tags.is_empty()
            && self.priority.is_none()
            && self.status.is_none()
            && self.metadata.is_none()
            && self.source.is_none()
    }

    /// Check field values without touching any idea.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for bad content or tags.
    pub fn validate(&self) -> Result<()> {
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        if let Some(tags) = &self.tags {
            normalize_tags(tags.iter().cloned())?;
        }
        normalize_tags(self.add_tags.iter().cloned())?;
        Ok(())
    }

    /// Apply the changes to `idea` and refresh its `updated` timestamp.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for bad content or tags; `idea` is
    /// untouched in that case.
    pub fn apply_to(self, idea: &mut Idea) -> Result<()> {
        self.validate()?;
        let source = self
            .source
            .as_ref()
            .map(SourceInfo::to_metadata_value)
            .transpose()?;

        if let Some(content) = self.content {
            idea.content = content;
        }
        if let Some(tags) = self.tags {
            idea.tags = normalize_tags(tags)?;
        }
        idea.add_tags(normalize_tags(self.add_tags)?);
        if let Some(priority) = self.priority {
            idea.priority = priority;
        }
        if let Some(status) = self.status {
            idea.status = status;
        }
        if let Some(metadata) = self.metadata {
            idea.metadata.extend(metadata);
        }
        if let Some(source) = source {
            idea.metadata.insert(SOURCE_METADATA_KEY.to_owned(), source);
        }
        idea.touch();
        Ok(())
    }
}

/// Reject empty, whitespace-only, or oversized content.
///
/// # Errors
///
/// Returns `AppError::Validation` describing the violated rule.
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".into()));
    }
    let length = content.chars().count();
    if length > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "content is {length} characters; the maximum is {MAX_CONTENT_CHARS}"
        )));
    }
    Ok(())
}

/// Normalize one tag: trim whitespace and a leading `#`.
///
/// # Errors
///
/// Returns `AppError::Validation` for empty or oversized tags.
pub fn normalize_tag(raw: &str) -> Result<String> {
    let tag = raw.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        return Err(AppError::Validation(format!("invalid tag '{raw}'")));
    }
    if tag.chars().count() > MAX_TAG_CHARS {
        return Err(AppError::Validation(format!(
            "tag '{tag}' is longer than {MAX_TAG_CHARS} characters"
        )));
    }
    Ok(tag.to_owned())
}

/// Normalize a tag list and drop duplicates, keeping first occurrences.
///
/// # Errors
///
/// Returns `AppError::Validation` if any tag is invalid.
pub fn normalize_tags<I>(tags: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut normalized: Vec<String> = Vec::new();
    for raw in tags {
        let tag = normalize_tag(&raw)?;
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    Ok(normalized)
}
