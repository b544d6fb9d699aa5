//! In-process document store.
//!
//! Evaluates the native index definitions over documents held in
//! insertion order and records every call so tests can assert exactly
//! which queries the query layer issued. Also backs the `--memory` mode
//! of both binaries.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{DocumentStore, GroupedCount, StoreStatus};
use crate::index::{IndexKey, IndexName, Reduce, ViewQuery};
use crate::models::Idea;
use crate::{AppError, Result};

/// A store call observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `ensure_database`.
    EnsureDatabase,
    /// `get(id)`.
    Get(String),
    /// `put` of the given id.
    Put(String),
    /// `delete(id, _)`.
    Delete(String),
    /// `scan(skip, limit)`.
    Scan {
        /// Rows skipped.
        skip: usize,
        /// Row limit.
        limit: Option<usize>,
    },
    /// `query_index(index, query)`.
    QueryIndex {
        /// Queried index.
        index: IndexName,
        /// Key selection.
        query: ViewQuery,
    },
    /// `grouped_counts(index)`.
    GroupedCounts(IndexName),
    /// `install_indexes`.
    InstallIndexes,
    /// `status`.
    Status,
}

#[derive(Debug, Default)]
struct MemoryState {
    database_exists: bool,
    indexes_installed: bool,
    /// Documents in insertion order.
    docs: Vec<Idea>,
    unavailable: bool,
}

/// In-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    calls: Mutex<Vec<StoreCall>>,
}

impl MemoryStore {
    /// Store with the database created and indexes installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                database_exists: true,
                indexes_installed: true,
                ..MemoryState::default()
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Store with neither database nor indexes, as before `idea setup`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Make every subsequent call fail with `AppError::Transport`.
    pub fn set_unavailable(&self, unavailable: bool) {
        lock(&self.state).unavailable = unavailable;
    }

    /// Number of stored ideas.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.state).docs.len()
    }

    /// Whether no ideas are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record `call` and return the state guard, failing when the store is
    /// marked unavailable.
    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, MemoryState>> {
        lock(&self.calls).push(call);
        let state = lock(&self.state);
        if state.unavailable {
            return Err(AppError::Transport("memory store unavailable".into()));
        }
        Ok(state)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_database(state: &MemoryState) -> Result<()> {
    if state.database_exists {
        Ok(())
    } else {
        Err(AppError::NotFound("database does not exist".into()))
    }
}

fn require_indexes(state: &MemoryState, index: IndexName) -> Result<()> {
    require_database(state)?;
    if state.indexes_installed {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("index {index} (design document missing; run setup)")))
    }
}

/// Revision `"{generation}-{digest}"`, where the digest covers the body.
fn next_revision(previous: Option<&str>, idea: &Idea) -> Result<String> {
    let generation = previous
        .and_then(|rev| rev.split_once('-'))
        .and_then(|(n, _)| n.parse::<u64>().ok())
        .unwrap_or(0)
        + 1;
    let body = serde_json::to_vec(&idea.to_document()?)
        .map_err(|err| AppError::Validation(format!("cannot encode idea {}: {err}", idea.id)))?;
    let mut hasher = Sha256::new();
    hasher.update(generation.to_be_bytes());
    hasher.update(&body);
    let digest = format!("{:x}", hasher.finalize());
    Ok(format!("{generation}-{}", &digest[..32]))
}

/// Index rows for every document, in key order with insertion-order ties.
fn rows<'a>(docs: &'a [Idea], index: IndexName) -> Vec<(IndexKey, Value, &'a Idea)> {
    let mut rows: Vec<(IndexKey, Value, &Idea)> = docs
        .iter()
        .flat_map(|idea| {
            index
                .emit(idea)
                .into_iter()
                .map(move |emission| (emission.key, emission.value, idea))
        })
        .collect();
    // Stable sort keeps insertion order for equal keys.
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

impl DocumentStore for MemoryStore {
    async fn ensure_database(&self) -> Result<()> {
        let mut state = self.begin(StoreCall::EnsureDatabase)?;
        state.database_exists = true;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Idea>> {
        let state = self.begin(StoreCall::Get(id.to_owned()))?;
        Ok(state.docs.iter().find(|idea| idea.id == id).cloned())
    }

    async fn put(&self, idea: &Idea) -> Result<String> {
        let mut state = self.begin(StoreCall::Put(idea.id.clone()))?;
        require_database(&state)?;
        let position = state.docs.iter().position(|doc| doc.id == idea.id);

        match (position, idea.revision.as_deref()) {
            (None, None) => {
                let revision = next_revision(None, idea)?;
                let mut stored = idea.clone();
                stored.revision = Some(revision.clone());
                state.docs.push(stored);
                Ok(revision)
            }
            (None, Some(_)) => Err(AppError::NotFound(format!("idea {}", idea.id))),
            (Some(_), None) => {
                Err(AppError::Conflict(format!("idea {}: document already exists", idea.id)))
            }
            (Some(index), Some(given)) => {
                let current = state.docs[index].revision.clone();
                if current.as_deref() != Some(given) {
                    return Err(AppError::Conflict(format!(
                        "idea {}: revision does not match",
                        idea.id
                    )));
                }
                let revision = next_revision(Some(given), idea)?;
                let mut stored = idea.clone();
                stored.revision = Some(revision.clone());
                state.docs[index] = stored;
                Ok(revision)
            }
        }
    }

    async fn delete(&self, id: &str, revision: &str) -> Result<()> {
        let mut state = self.begin(StoreCall::Delete(id.to_owned()))?;
        require_database(&state)?;
        let Some(position) = state.docs.iter().position(|doc| doc.id == id) else {
            return Err(AppError::NotFound(format!("idea {id}")));
        };
        if state.docs[position].revision.as_deref() != Some(revision) {
            return Err(AppError::Conflict(format!("idea {id}: revision does not match")));
        }
        state.docs.remove(position);
        Ok(())
    }

    async fn scan(&self, skip: usize, limit: Option<usize>) -> Result<Vec<Idea>> {
        let state = self.begin(StoreCall::Scan { skip, limit })?;
        require_database(&state)?;
        let page = state.docs.iter().skip(skip).cloned();
        Ok(match limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        })
    }

    async fn query_index(&self, index: IndexName, query: &ViewQuery) -> Result<Vec<Idea>> {
        let state = self.begin(StoreCall::QueryIndex {
            index,
            query: query.clone(),
        })?;
        require_indexes(&state, index)?;
        Ok(rows(&state.docs, index)
            .into_iter()
            .filter(|(key, _, _)| query.matches(key))
            .map(|(_, _, idea)| idea.clone())
            .collect())
    }

    async fn grouped_counts(&self, index: IndexName) -> Result<Vec<GroupedCount>> {
        let state = self.begin(StoreCall::GroupedCounts(index))?;
        require_indexes(&state, index)?;
        let Some(reduce) = index.reduce() else {
            return Err(AppError::Validation(format!("index {index} has no reduce function")));
        };

        let mut groups: BTreeMap<IndexKey, u64> = BTreeMap::new();
        for (key, value, _) in rows(&state.docs, index) {
            let amount = match reduce {
                Reduce::Count => 1,
                Reduce::Sum => value.as_u64().unwrap_or(0),
            };
            *groups.entry(key).or_insert(0) += amount;
        }
        Ok(groups
            .into_iter()
            .map(|(key, count)| (key.to_text(), count))
            .collect())
    }

    async fn install_indexes(&self) -> Result<()> {
        let mut state = self.begin(StoreCall::InstallIndexes)?;
        state.database_exists = true;
        state.indexes_installed = true;
        Ok(())
    }

    async fn status(&self) -> Result<StoreStatus> {
        let state = self.begin(StoreCall::Status)?;
        Ok(StoreStatus {
            vendor: "memory".into(),
            version: Some(env!("CARGO_PKG_VERSION").into()),
            user: Some("memory".into()),
            database_exists: state.database_exists,
            doc_count: state
                .database_exists
                .then(|| u64::try_from(state.docs.len()).unwrap_or(u64::MAX)),
            indexes_installed: state.indexes_installed,
        })
    }
}
