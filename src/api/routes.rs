//! REST handlers for `{api_prefix}/...`.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::models::{CreateIdeaRequest, Idea, Metadata, Priority, Status, UpdateIdeaRequest};
use crate::persistence::DocumentStore;
use crate::query::{KeyCount, ListQuery, Stats};
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;
type SharedState<S> = State<Arc<AppState<S>>>;

/// Idea as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaBody {
    /// Identifier.
    pub id: String,
    /// Current revision; pass back as `rev` for conditional writes.
    pub rev: Option<String>,
    /// Free text body.
    pub content: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Priority.
    pub priority: Priority,
    /// Status.
    pub status: Status,
    /// Metadata, including `source` when recorded.
    pub metadata: Metadata,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated: DateTime<Utc>,
}

impl From<Idea> for IdeaBody {
    fn from(idea: Idea) -> Self {
        Self {
            id: idea.id,
            rev: idea.revision,
            content: idea.content,
            tags: idea.tags,
            priority: idea.priority,
            status: idea.status,
            metadata: idea.metadata,
            created: idea.created,
            updated: idea.updated,
        }
    }
}

/// `PATCH` body: the changes plus an optional expected revision.
#[derive(Debug, Deserialize)]
pub struct PatchBody {
    /// Revision the caller last saw; a stale value yields 409.
    #[serde(default)]
    pub rev: Option<String>,
    /// Fields to change.
    #[serde(flatten)]
    pub changes: UpdateIdeaRequest,
}

/// Query string for `GET /next`.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Maximum number of ideas.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string for `DELETE /{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Revision to delete at; the current revision when omitted.
    #[serde(default)]
    pub rev: Option<String>,
}

/// Routes relative to the API prefix.
#[must_use]
pub fn routes<S: DocumentStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/", get(list::<S>).post(create::<S>))
        .route("/next", get(next_actions::<S>))
        .route("/tags", get(tags::<S>))
        .route("/stats", get(stats::<S>))
        .route(
            "/{id}",
            get(fetch::<S>).patch(update::<S>).delete(remove::<S>),
        )
}

async fn create<S: DocumentStore>(
    State(state): SharedState<S>,
    body: std::result::Result<Json<CreateIdeaRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<IdeaBody>)> {
    let Json(request) = body?;
    let idea = state.service.create(request).await?;
    Ok((StatusCode::CREATED, Json(idea.into())))
}

async fn list<S: DocumentStore>(
    State(state): SharedState<S>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<IdeaBody>>> {
    let Query(query) = query?;
    let ideas = state.service.list(&query).await?;
    Ok(Json(ideas.into_iter().map(IdeaBody::from).collect()))
}

async fn next_actions<S: DocumentStore>(
    State(state): SharedState<S>,
    query: std::result::Result<Query<NextQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<IdeaBody>>> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(state.config.next_limit);
    let ideas = state.service.next_actions(limit).await?;
    Ok(Json(ideas.into_iter().map(IdeaBody::from).collect()))
}

async fn tags<S: DocumentStore>(State(state): SharedState<S>) -> ApiResult<Json<Vec<KeyCount>>> {
    Ok(Json(state.service.tag_counts().await?))
}

async fn stats<S: DocumentStore>(State(state): SharedState<S>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.service.stats().await?))
}

async fn fetch<S: DocumentStore>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
) -> ApiResult<Json<IdeaBody>> {
    let idea = state.service.require(&id).await?;
    Ok(Json(idea.into()))
}

async fn update<S: DocumentStore>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    body: std::result::Result<Json<PatchBody>, JsonRejection>,
) -> ApiResult<Json<IdeaBody>> {
    let Json(PatchBody { rev, changes }) = body?;
    let idea = match rev {
        None => state.service.update(&id, changes).await?,
        Some(rev) => {
            changes.validate()?;
            let mut idea = state.service.require(&id).await?;
            changes.apply_to(&mut idea)?;
            idea.revision = Some(rev);
            state.service.update_with_revision(idea).await?
        }
    };
    Ok(Json(idea.into()))
}

async fn remove<S: DocumentStore>(
    State(state): SharedState<S>,
    Path(id): Path<String>,
    query: std::result::Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<StatusCode> {
    let Query(query) = query?;
    match query.rev.as_deref() {
        Some(rev) if !rev.is_empty() => state.service.delete_with_revision(&id, rev).await?,
        _ => state.service.delete(&id).await?,
    }
    Ok(StatusCode::NO_CONTENT)
}
