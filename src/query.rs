//! Filter resolution and read-side queries.
//!
//! A [`ListQuery`] is resolved into an explicit [`RetrievalPlan`] that
//! names the index (or full scan) used to answer it. The precedence is
//! fixed:
//!
//! 1. status and priority: `by_status_and_priority` with `[status, rank]`
//! 2. tag and status: `by_tag_and_status` with `[tag, status]`
//! 3. tag and priority: `by_tag`, then filter by priority in process
//!    (there is no `[tag, priority]` index)
//! 4. a single filter: its single-field index
//! 5. no filter: paginated scan
//!
//! Filtered results are truncated to `limit` after retrieval; `skip` only
//! applies to the scan.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::index::{IndexKey, IndexName, ViewQuery};
use crate::models::{Idea, Priority, Status};
use crate::persistence::DocumentStore;
use crate::service::IdeaService;
use crate::Result;

/// Optional filters plus pagination for listing ideas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Only ideas in this state.
    #[serde(default)]
    pub status: Option<Status>,
    /// Only ideas with this priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Only ideas carrying this tag.
    #[serde(default)]
    pub tag: Option<String>,
    /// Maximum number of ideas returned.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Ideas skipped; unfiltered listings only.
    #[serde(default)]
    pub skip: usize,
}

impl ListQuery {
    /// Tag filter with surrounding whitespace and a leading `#` removed;
    /// `None` when that leaves nothing.
    #[must_use]
    pub fn tag_filter(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(|tag| tag.trim().trim_start_matches('#').trim())
            .filter(|tag| !tag.is_empty())
    }
}

/// How a [`ListQuery`] is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalPlan {
    /// Compound `[status, priority rank]` lookup.
    StatusAndPriority {
        /// Status key part.
        status: Status,
        /// Priority key part.
        priority: Priority,
    },
    /// Compound `[tag, status]` lookup.
    TagAndStatus {
        /// Tag key part.
        tag: String,
        /// Status key part.
        status: Status,
    },
    /// Tag lookup followed by an in-process priority filter.
    TagThenPriority {
        /// Tag key.
        tag: String,
        /// Priority every returned idea must have.
        priority: Priority,
    },
    /// Single-field status lookup.
    Status(Status),
    /// Single-field priority lookup.
    Priority(Priority),
    /// Single-field tag lookup.
    Tag(String),
    /// Unfiltered paginated scan.
    Scan {
        /// Ideas skipped.
        skip: usize,
        /// Maximum ideas returned.
        limit: Option<usize>,
    },
}

impl RetrievalPlan {
    /// Choose the retrieval path for `query`.
    #[must_use]
    pub fn resolve(query: &ListQuery) -> Self {
        let tag = query.tag_filter().map(str::to_owned);
        match (query.status, query.priority, tag) {
            (Some(status), Some(priority), _) => Self::StatusAndPriority { status, priority },
            (Some(status), None, Some(tag)) => Self::TagAndStatus { tag, status },
            (None, Some(priority), Some(tag)) => Self::TagThenPriority { tag, priority },
            (Some(status), None, None) => Self::Status(status),
            (None, Some(priority), None) => Self::Priority(priority),
            (None, None, Some(tag)) => Self::Tag(tag),
            (None, None, None) => Self::Scan {
                skip: query.skip,
                limit: query.limit,
            },
        }
    }

    /// Index and key used, or `None` for the scan.
    #[must_use]
    pub fn index_query(&self) -> Option<(IndexName, ViewQuery)> {
        let (index, key) = match self {
            Self::StatusAndPriority { status, priority } => (
                IndexName::ByStatusAndPriority,
                IndexKey::status_priority(*status, *priority),
            ),
            Self::TagAndStatus { tag, status } => (
                IndexName::ByTagAndStatus,
                IndexKey::tag_status(tag, *status),
            ),
            Self::TagThenPriority { tag, .. } | Self::Tag(tag) => {
                (IndexName::ByTag, IndexKey::tag(tag))
            }
            Self::Status(status) => (IndexName::ByStatus, IndexKey::status(*status)),
            Self::Priority(priority) => (IndexName::ByPriority, IndexKey::priority(*priority)),
            Self::Scan { .. } => return None,
        };
        Some((index, ViewQuery::Key(key)))
    }

    /// Priority applied in process after retrieval, if any.
    #[must_use]
    pub fn client_filter(&self) -> Option<Priority> {
        match self {
            Self::TagThenPriority { priority, .. } => Some(*priority),
            _ => None,
        }
    }

    /// One-line description for logs and `--explain` style output.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.index_query(), self.client_filter()) {
            (Some((index, ViewQuery::Key(key))), Some(priority)) => format!(
                "index {index} key {} then filter priority={priority}",
                key.to_query_value()
            ),
            (Some((index, ViewQuery::Key(key))), None) => {
                format!("index {index} key {}", key.to_query_value())
            }
            (Some((index, _)), _) => format!("index {index}"),
            (None, _) => match self {
                Self::Scan {
                    skip,
                    limit: Some(limit),
                } => format!("scan skip={skip} limit={limit}"),
                Self::Scan { skip, .. } => format!("scan skip={skip}"),
                _ => "scan".to_owned(),
            },
        }
    }
}

/// Usage count for one tag or metadata key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    /// Tag or metadata key.
    pub key: String,
    /// Number of ideas using it.
    pub count: u64,
}

/// Idea count for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// Status.
    pub status: Status,
    /// Ideas in that status.
    pub count: u64,
}

/// Idea count for one priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    /// Priority.
    pub priority: Priority,
    /// Ideas with that priority.
    pub count: u64,
}

/// Aggregate summary shown by `idea stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Total ideas (sum of status counts).
    pub total: u64,
    /// Counts per status in reporting order.
    pub by_status: Vec<StatusCount>,
    /// Counts per priority in reporting order.
    pub by_priority: Vec<PriorityCount>,
    /// Number of distinct tags.
    pub unique_tags: usize,
}

impl<S: DocumentStore> IdeaService<S> {
    /// Retrieval plan that [`IdeaService::list`] would use.
    #[must_use]
    pub fn explain(&self, query: &ListQuery) -> RetrievalPlan {
        RetrievalPlan::resolve(query)
    }

    /// List ideas matching `query`.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Idea>> {
        let plan = RetrievalPlan::resolve(query);
        debug!(plan = %plan.describe(), "listing ideas");

        let Some((index, view)) = plan.index_query() else {
            return self.store().scan(query.skip, query.limit).await;
        };

        let mut ideas = self.store().query_index(index, &view).await?;
        if let Some(priority) = plan.client_filter() {
            ideas.retain(|idea| idea.priority == priority);
        }
        if let Some(limit) = query.limit {
            ideas.truncate(limit);
        }
        Ok(ideas)
    }

    /// Todo ideas, most important first, at most `limit` of them.
    ///
    /// Equal priorities keep creation order.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn next_actions(&self, limit: usize) -> Result<Vec<Idea>> {
        let mut ideas = self
            .store()
            .query_index(IndexName::NextActions, &ViewQuery::All)
            .await?;
        ideas.sort_by_key(|idea| (idea.priority.rank(), idea.created));
        ideas.truncate(limit);
        Ok(ideas)
    }

    /// Ideas carrying `tag`, optionally truncated.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn search_by_tag(&self, tag: &str, limit: Option<usize>) -> Result<Vec<Idea>> {
        self.list(&ListQuery {
            tag: Some(tag.to_owned()),
            limit,
            ..ListQuery::default()
        })
        .await
    }

    /// Tag usage, most used first, ties by tag name.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn tag_counts(&self) -> Result<Vec<KeyCount>> {
        let rows = self.store().grouped_counts(IndexName::AllTags).await?;
        Ok(sorted_counts(rows))
    }

    /// Metadata key usage, most used first, ties by key.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn metadata_keys(&self) -> Result<Vec<KeyCount>> {
        let rows = self.store().grouped_counts(IndexName::MetadataKeys).await?;
        Ok(sorted_counts(rows))
    }

    /// Count per status, every status present, in reporting order.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>> {
        let counts = self.grouped(IndexName::ByStatus).await?;
        Ok(Status::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: counts.get(status.as_str()).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Count per priority, every priority present, in reporting order.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn priority_counts(&self) -> Result<Vec<PriorityCount>> {
        let counts = self.grouped(IndexName::ByPriority).await?;
        Ok(Priority::ALL
            .into_iter()
            .map(|priority| PriorityCount {
                priority,
                count: counts.get(priority.as_str()).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Status, priority, and tag summary.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn stats(&self) -> Result<Stats> {
        let by_status = self.status_counts().await?;
        let by_priority = self.priority_counts().await?;
        let unique_tags = self.tag_counts().await?.len();
        Ok(Stats {
            total: by_status.iter().map(|entry| entry.count).sum(),
            by_status,
            by_priority,
            unique_tags,
        })
    }

    async fn grouped(&self, index: IndexName) -> Result<HashMap<String, u64>> {
        Ok(self
            .store()
            .grouped_counts(index)
            .await?
            .into_iter()
            .collect())
    }
}

fn sorted_counts(rows: Vec<(String, u64)>) -> Vec<KeyCount> {
    let mut counts: Vec<KeyCount> = rows
        .into_iter()
        .map(|(key, count)| KeyCount { key, count })
        .collect();
    counts.sort_by(|a, b| {
        Reverse(a.count)
            .cmp(&Reverse(b.count))
            .then_with(|| a.key.cmp(&b.key))
    });
    counts
}
