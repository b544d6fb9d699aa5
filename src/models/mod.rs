//! Domain model module declarations.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub mod idea;
pub mod metadata;
pub mod request;

pub use idea::{DocKind, Idea, Priority, Status};
pub use metadata::{Metadata, MetadataValue};
pub use request::{CreateIdeaRequest, SourceInfo, UpdateIdeaRequest};

/// Deserialize a stored timestamp, accepting RFC 3339 values as well as
/// offset-less ISO 8601 values written by older clients (read as UTC).
pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Parse a timestamp string in RFC 3339 or naive ISO 8601 form.
///
/// # Errors
///
/// Returns a description of the failure when neither form matches.
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("invalid timestamp '{raw}': {err}"))
}
