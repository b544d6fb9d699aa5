//! Idea service: validated mutations over a [`DocumentStore`].
//!
//! Queries live in [`crate::query`]; both extend the same
//! [`IdeaService`], which every front end receives at startup.

use tracing::{debug, info, info_span, Instrument};

use crate::models::{CreateIdeaRequest, Idea, UpdateIdeaRequest};
use crate::persistence::{DocumentStore, StoreStatus};
use crate::render::truncate_text;
use crate::{AppError, Result};

/// Entry point for every idea operation.
#[derive(Debug)]
pub struct IdeaService<S> {
    store: S,
}

impl<S: DocumentStore> IdeaService<S> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate and persist a new idea, creating the database if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` before touching the store when the
    /// request is invalid; store failures propagate unchanged.
    pub async fn create(&self, request: CreateIdeaRequest) -> Result<Idea> {
        let mut idea = request.into_idea()?;
        let span = info_span!("create_idea", id = %idea.id);
        let written: Result<String> = async {
            self.store.ensure_database().await?;
            self.store.put(&idea).await
        }
        .instrument(span)
        .await;
        idea.revision = Some(written?);
        info!(
            id = %idea.id,
            content = %truncate_text(&idea.content, 50),
            priority = %idea.priority,
            status = %idea.status,
            "idea created"
        );
        Ok(idea)
    }

    /// Fetch an idea; `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get(&self, id: &str) -> Result<Option<Idea>> {
        self.store.get(id).await
    }

    /// Fetch an idea that must exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when absent.
    pub async fn require(&self, id: &str) -> Result<Idea> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("idea {id}")))
    }

    /// Apply a partial update to the latest stored revision.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` before any store call for invalid
    /// changes, `AppError::NotFound` if the idea is absent, and
    /// `AppError::Conflict` if it changed between read and write.
    pub async fn update(&self, id: &str, request: UpdateIdeaRequest) -> Result<Idea> {
        request.validate()?;
        let mut idea = self.require(id).await?;
        request.apply_to(&mut idea)?;
        self.save(idea).await
    }

    /// Persist an idea the caller already holds, revision included.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if `idea.revision` is stale; the stored
    /// document is left unchanged.
    pub async fn update_with_revision(&self, mut idea: Idea) -> Result<Idea> {
        crate::models::request::validate_content(&idea.content)?;
        idea.touch();
        self.save(idea).await
    }

    async fn save(&self, mut idea: Idea) -> Result<Idea> {
        let revision = self.store.put(&idea).await?;
        debug!(id = %idea.id, %revision, "idea updated");
        idea.revision = Some(revision);
        Ok(idea)
    }

    /// Delete an idea at its current revision.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the idea is absent.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let idea = self.require(id).await?;
        let revision = idea
            .revision
            .ok_or_else(|| AppError::Transport(format!("idea {id} has no revision")))?;
        self.delete_with_revision(id, &revision).await
    }

    /// Delete an idea at a caller-held revision.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if the revision is stale and
    /// `AppError::NotFound` if the idea is absent.
    pub async fn delete_with_revision(&self, id: &str, revision: &str) -> Result<()> {
        self.store.delete(id, revision).await?;
        info!(id, "idea deleted");
        Ok(())
    }

    /// Create the database and (re)install the design document.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn setup(&self) -> Result<()> {
        self.store.ensure_database().await?;
        self.store.install_indexes().await
    }

    /// Connection diagnostics.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn diagnose(&self) -> Result<StoreStatus> {
        self.store.status().await
    }
}
