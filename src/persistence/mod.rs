//! Persistence layer: the document store contract and its implementations.

use std::future::Future;

use serde::Serialize;

use crate::index::{IndexName, ViewQuery};
use crate::models::Idea;
use crate::Result;

pub mod couch;
pub mod memory;

pub use couch::CouchStore;
pub use memory::{MemoryStore, StoreCall};

/// One grouped-reduce row: index key (as text) and its reduced count.
pub type GroupedCount = (String, u64);

/// Connection diagnostics reported by `idea doctor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Store vendor, e.g. `The Apache Software Foundation` or `memory`.
    pub vendor: String,
    /// Server version string, when reported.
    pub version: Option<String>,
    /// Authenticated user name, when the session endpoint reports one.
    pub user: Option<String>,
    /// Whether the idea database exists.
    pub database_exists: bool,
    /// Number of documents in the database (ideas plus design documents).
    pub doc_count: Option<u64>,
    /// Whether the design document holding the indexes is installed.
    pub indexes_installed: bool,
}

/// Contract between the query layer and a document store.
///
/// Revisions are compare-and-swap tokens: a write must present the current
/// revision of the stored document or it fails with `AppError::Conflict`
/// and leaves the stored state unchanged.
pub trait DocumentStore: Send + Sync + 'static {
    /// Create the database if it does not exist.
    fn ensure_database(&self) -> impl Future<Output = Result<()>> + Send;

    /// Fetch one idea; `Ok(None)` when the id is absent.
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Idea>>> + Send;

    /// Write an idea and return its new revision.
    ///
    /// `idea.revision == None` creates the document (conflict if the id is
    /// taken); `Some(rev)` replaces it (not found if absent, conflict if
    /// `rev` is stale).
    fn put(&self, idea: &Idea) -> impl Future<Output = Result<String>> + Send;

    /// Delete by id and current revision.
    fn delete(&self, id: &str, revision: &str) -> impl Future<Output = Result<()>> + Send;

    /// Ideas in storage order, paginated.
    fn scan(
        &self,
        skip: usize,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<Idea>>> + Send;

    /// Ideas whose index rows match `query`, in index key order.
    fn query_index(
        &self,
        index: IndexName,
        query: &ViewQuery,
    ) -> impl Future<Output = Result<Vec<Idea>>> + Send;

    /// Reduced row values grouped by exact key, in key order.
    fn grouped_counts(
        &self,
        index: IndexName,
    ) -> impl Future<Output = Result<Vec<GroupedCount>>> + Send;

    /// Install (or refresh) the design document holding every index.
    fn install_indexes(&self) -> impl Future<Output = Result<()>> + Send;

    /// Report connection diagnostics.
    fn status(&self) -> impl Future<Output = Result<StoreStatus>> + Send;
}
