//! Open metadata map attached to every idea.
//!
//! Values are restricted to a closed set of JSON-like variants so the core
//! never handles arbitrary untyped payloads. Validation happens when the
//! map enters the system (CLI flag, REST body, MCP arguments).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Open mapping of metadata key to value.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// JSON `null`.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integral number.
    Integer(i64),
    /// Integral number above `i64::MAX`.
    Unsigned(u64),
    /// Non-integral number.
    Float(f64),
    /// Free text.
    Text(String),
    /// Ordered list of values.
    List(Vec<MetadataValue>),
    /// Nested mapping.
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    /// Convert an arbitrary JSON value into a metadata value.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the value does not fit any variant.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|err| AppError::Validation(format!("unsupported metadata value: {err}")))
    }

    /// Text content when this value is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::Unsigned(value), Self::Integer)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Parse a metadata map from a JSON object string (as given to `idea add -m`).
///
/// # Errors
///
/// Returns `AppError::Validation` if the text is not valid JSON or is not
/// a JSON object.
pub fn parse_metadata_json(raw: &str) -> Result<Metadata> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|err| AppError::Validation(format!("invalid JSON metadata: {err}")))?;
    if !value.is_object() {
        return Err(AppError::Validation("metadata must be a JSON object".into()));
    }
    serde_json::from_value(value)
        .map_err(|err| AppError::Validation(format!("unsupported metadata value: {err}")))
}
