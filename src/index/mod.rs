//! Secondary indexes over idea documents.
//!
//! Each [`IndexName`] has two renderings that must agree: a JavaScript map
//! (and optional reduce) installed in `CouchDB` as part of the design
//! document, and a native [`IndexName::emit`] used by the in-memory store.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{Idea, Priority, Status};
use crate::render;

pub mod design;

pub use design::{design_document, DESIGN_DOC_ID};

/// Rank for a priority wire value: high 1, medium 2, low 3, anything else 4.
#[must_use]
pub fn priority_rank(priority: &str) -> u64 {
    match priority {
        "high" => 1,
        "medium" => 2,
        "low" => 3,
        _ => 4,
    }
}

/// Named secondary index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexName {
    /// Key: status.
    ByStatus,
    /// Key: priority.
    ByPriority,
    /// Key: tag, one row per tag.
    ByTag,
    /// Key: priority rank, todo ideas only.
    NextActions,
    /// Key: `[status, priority rank]`.
    ByStatusAndPriority,
    /// Key: `[tag, status]`, one row per tag.
    ByTagAndStatus,
    /// Key: tag, reduced to a count.
    AllTags,
    /// Key: metadata key, reduced to a count.
    MetadataKeys,
    /// Key: `[priority rank, created]`, value: display fields.
    FormattedList,
}

/// Reduce function attached to an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    /// Built-in `_count`.
    Count,
    /// Built-in `_sum` over numeric values.
    Sum,
}

impl Reduce {
    /// Built-in reduce name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "_count",
            Self::Sum => "_sum",
        }
    }
}

impl IndexName {
    /// Every index in the design document.
    pub const ALL: [Self; 9] = [
        Self::ByStatus,
        Self::ByPriority,
        Self::ByTag,
        Self::NextActions,
        Self::ByStatusAndPriority,
        Self::ByTagAndStatus,
        Self::AllTags,
        Self::MetadataKeys,
        Self::FormattedList,
    ];

    /// View name inside the design document.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByStatus => "by_status",
            Self::ByPriority => "by_priority",
            Self::ByTag => "by_tag",
            Self::NextActions => "next_actions",
            Self::ByStatusAndPriority => "by_status_and_priority",
            Self::ByTagAndStatus => "by_tag_and_status",
            Self::AllTags => "all_tags",
            Self::MetadataKeys => "metadata_keys",
            Self::FormattedList => "formatted_list",
        }
    }

    /// Reduce function, if the index supports grouped counts.
    #[must_use]
    pub fn reduce(self) -> Option<Reduce> {
        match self {
            Self::ByStatus | Self::ByPriority | Self::ByTag | Self::MetadataKeys => {
                Some(Reduce::Count)
            }
            Self::AllTags => Some(Reduce::Sum),
            _ => None,
        }
    }

    /// Rows this index produces for one idea, mirroring the JavaScript map.
    #[must_use]
    pub fn emit(self, idea: &Idea) -> Vec<Emission> {
        match self {
            Self::ByStatus => vec![Emission::doc(IndexKey::status(idea.status))],
            Self::ByPriority => vec![Emission::doc(IndexKey::priority(idea.priority))],
            Self::ByTag => idea
                .tags
                .iter()
                .map(|tag| Emission::doc(IndexKey::tag(tag)))
                .collect(),
            Self::NextActions => {
                if idea.status == Status::Todo {
                    vec![Emission::doc(IndexKey::rank(idea.priority.rank()))]
                } else {
                    Vec::new()
                }
            }
            Self::ByStatusAndPriority => {
                vec![Emission::doc(IndexKey::status_priority(idea.status, idea.priority))]
            }
            Self::ByTagAndStatus => idea
                .tags
                .iter()
                .map(|tag| Emission::doc(IndexKey::tag_status(tag, idea.status)))
                .collect(),
            Self::AllTags => idea
                .tags
                .iter()
                .map(|tag| Emission::counted(IndexKey::tag(tag)))
                .collect(),
            Self::MetadataKeys => idea
                .metadata
                .keys()
                .map(|key| Emission::doc(IndexKey::tag(key)))
                .collect(),
            Self::FormattedList => vec![Emission {
                key: IndexKey(json!([idea.priority.rank(), idea.created])),
                value: json!({
                    "display": render::display_line(idea),
                    "id": idea.id,
                    "content": idea.content,
                    "priority": idea.priority.as_str(),
                    "status": idea.status.as_str(),
                    "tags": idea.tags,
                    "created": idea.created,
                    "updated": idea.updated,
                }),
            }],
        }
    }
}

impl Display for IndexName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row emitted by an index map.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// Row key.
    pub key: IndexKey,
    /// Row value (`null` for document rows, `1` for counted rows).
    pub value: Value,
}

impl Emission {
    fn doc(key: IndexKey) -> Self {
        Self {
            key,
            value: Value::Null,
        }
    }

    fn counted(key: IndexKey) -> Self {
        Self {
            key,
            value: json!(1),
        }
    }
}

/// Index key, compared with `CouchDB` view collation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexKey(pub Value);

impl IndexKey {
    /// Status key.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self(json!(status.as_str()))
    }

    /// Priority key.
    #[must_use]
    pub fn priority(priority: Priority) -> Self {
        Self(json!(priority.as_str()))
    }

    /// Tag (or any plain string) key.
    #[must_use]
    pub fn tag(tag: &str) -> Self {
        Self(json!(tag))
    }

    /// Priority rank key.
    #[must_use]
    pub fn rank(rank: u64) -> Self {
        Self(json!(rank))
    }

    /// Compound `[status, priority rank]` key.
    #[must_use]
    pub fn status_priority(status: Status, priority: Priority) -> Self {
        Self(json!([status.as_str(), priority.rank()]))
    }

    /// Compound `[tag, status]` key.
    #[must_use]
    pub fn tag_status(tag: &str, status: Status) -> Self {
        Self(json!([tag, status.as_str()]))
    }

    /// JSON text for `key=`/`startkey=` query parameters.
    #[must_use]
    pub fn to_query_value(&self) -> String {
        self.0.to_string()
    }

    /// Key as plain text: the string itself, or its JSON rendering.
    #[must_use]
    pub fn to_text(&self) -> String {
        match &self.0 {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        collate(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        collate(&self.0, &other.0)
    }
}

/// Key selection for an index query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewQuery {
    /// Every row in key order.
    All,
    /// Rows whose key equals the given key.
    Key(IndexKey),
    /// Rows with `start <= key <= end`.
    Range {
        /// Inclusive lower bound.
        start: IndexKey,
        /// Inclusive upper bound.
        end: IndexKey,
    },
}

impl ViewQuery {
    /// Whether a row key is selected.
    #[must_use]
    pub fn matches(&self, key: &IndexKey) -> bool {
        match self {
            Self::All => true,
            Self::Key(wanted) => key == wanted,
            Self::Range { start, end } => key >= start && key <= end,
        }
    }
}

/// Compare two JSON values with `CouchDB` view collation:
/// `null < false < true < numbers < strings < arrays < objects`.
///
/// Strings compare case-insensitively first; among keys that differ only in
/// case, lowercase sorts before uppercase (`"a" < "A" < "b"`), as the
/// server's ICU ordering does.
#[must_use]
pub fn collate(left: &Value, right: &Value) -> Ordering {
    let class = type_class(left).cmp(&type_class(right));
    if class != Ordering::Equal {
        return class;
    }
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => collate_text(a, b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| collate(x, y))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (Value::Object(a), Value::Object(b)) => a
            .iter()
            .zip(b.iter())
            .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| collate(va, vb)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        _ => Ordering::Equal,
    }
}

fn collate_text(left: &str, right: &str) -> Ordering {
    let folded = left.to_lowercase().cmp(&right.to_lowercase());
    if folded != Ordering::Equal {
        return folded;
    }
    match left.chars().zip(right.chars()).find(|(a, b)| a != b) {
        Some((a, b)) if a.is_lowercase() && !b.is_lowercase() => Ordering::Less,
        Some((a, b)) if !a.is_lowercase() && b.is_lowercase() => Ordering::Greater,
        Some((a, b)) => a.cmp(&b),
        None => left.len().cmp(&right.len()),
    }
}

fn type_class(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(false) => 1,
        Value::Bool(true) => 2,
        Value::Number(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}
