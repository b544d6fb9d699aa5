//! `CouchDB` document store over HTTP.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{DocumentStore, GroupedCount, StoreStatus};
use crate::config::StoreConfig;
use crate::index::design::DESIGN_DOC_NAME;
use crate::index::{design_document, IndexName, ViewQuery, DESIGN_DOC_ID};
use crate::models::Idea;
use crate::{AppError, Result};

/// Store backed by a `CouchDB` server.
///
/// One [`reqwest::Client`] is built at construction and reused for every
/// request.
#[derive(Debug, Clone)]
pub struct CouchStore {
    client: Client,
    base: Url,
    config: StoreConfig,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    rev: String,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    docs: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    key: Value,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    doc: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ServerInfo {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    vendor: Option<Vendor>,
}

#[derive(Debug, Deserialize)]
struct Vendor {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionInfo {
    #[serde(default, rename = "userCtx")]
    user_ctx: Option<UserCtx>,
}

#[derive(Debug, Deserialize)]
struct UserCtx {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatabaseInfo {
    #[serde(default)]
    doc_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DesignRevision {
    #[serde(rename = "_rev")]
    rev: String,
}

impl CouchStore {
    /// Build a store client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let base = Url::parse(&config.url).map_err(|err| {
            AppError::Config(format!("invalid CouchDB url '{}': {err}", config.url))
        })?;
        if base.cannot_be_a_base() {
            let url = &config.url;
            return Err(AppError::Config(format!("store url '{url}' cannot carry a path")));
        }

        let mut builder = Client::builder();
        if config.request_timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Database name this store writes to.
    #[must_use]
    pub fn database(&self) -> &str {
        &self.config.database
    }

    /// URL for a path below the server root; segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::Config("store url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn db_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = Vec::with_capacity(segments.len() + 1);
        all.push(self.config.database.as_str());
        all.extend_from_slice(segments);
        self.url(&all)
    }

    fn view_url(&self, index: IndexName) -> Result<Url> {
        self.db_url(&["_design", DESIGN_DOC_NAME, "_view", index.as_str()])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match self.config.auth() {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Send a request; non-success statuses become typed errors.
    async fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, context, &body))
    }

    async fn fetch_rows(&self, url: Url, context: &str) -> Result<Vec<Row>> {
        let response = self.send(self.request(Method::GET, url), context).await?;
        let parsed: RowsResponse = response.json().await?;
        Ok(parsed.rows)
    }

    async fn design_revision(&self) -> Result<Option<String>> {
        let url = self.db_url(&["_design", DESIGN_DOC_NAME])?;
        let request = self.request(Method::GET, url);
        match self.send(request, DESIGN_DOC_ID).await {
            Ok(response) => {
                let parsed: DesignRevision = response.json().await?;
                Ok(Some(parsed.rev))
            }
            Err(AppError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Map a non-success `CouchDB` status to an application error.
fn status_error(status: StatusCode, context: &str, body: &str) -> AppError {
    let reason = couch_reason(body);
    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(context.to_owned()),
        StatusCode::CONFLICT => AppError::Conflict(format!("{context}: revision does not match")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AppError::Config(format!("CouchDB rejected the credentials ({status}): {reason}"))
        }
        StatusCode::BAD_REQUEST => AppError::Validation(format!("{context}: {reason}")),
        _ => AppError::Transport(format!("{context}: unexpected status {status}: {reason}")),
    }
}

/// Extract `reason` from a `CouchDB` error body, or fall back to the raw text.
fn couch_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("reason")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

/// Mango query for one page of idea documents in id order.
fn find_page_body(skip: usize, limit: usize) -> Value {
    json!({
        "selector": { "type": "idea" },
        "skip": skip,
        "limit": limit,
    })
}

/// Documents attached to `include_docs` rows.
fn row_docs(rows: Vec<Row>) -> impl Iterator<Item = Value> {
    rows.into_iter().filter_map(|row| row.doc)
}

/// Decode documents into ideas, skipping design and foreign docs.
fn decode_docs(docs: impl IntoIterator<Item = Value>) -> Vec<Idea> {
    docs.into_iter()
        .filter(|doc| doc.get("type").and_then(Value::as_str) == Some("idea"))
        .filter_map(|doc| match Idea::from_document(doc) {
            Ok(idea) => Some(idea),
            Err(err) => {
                warn!(%err, "skipping unreadable idea document");
                None
            }
        })
        .collect()
}

impl DocumentStore for CouchStore {
    async fn ensure_database(&self) -> Result<()> {
        let url = self.db_url(&[])?;
        let request = self.request(Method::GET, url.clone());
        match self.send(request, self.database()).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => {
                info!(database = self.database(), "creating database");
                let response = self.request(Method::PUT, url).send().await?;
                // 412 means another client created it in between.
                if response.status().is_success()
                    || response.status() == StatusCode::PRECONDITION_FAILED
                {
                    Ok(())
                } else {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    Err(status_error(status, self.database(), &body))
                }
            }
            Err(err) => Err(err),
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Idea>> {
        let url = self.db_url(&[id])?;
        match self.send(self.request(Method::GET, url), id).await {
            Ok(response) => {
                let document: Value = response.json().await?;
                Idea::from_document(document).map(Some)
            }
            Err(AppError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn put(&self, idea: &Idea) -> Result<String> {
        let url = self.db_url(&[idea.id.as_str()])?;
        let document = idea.to_document()?;
        let context = format!("idea {}", idea.id);
        let response = self
            .send(self.request(Method::PUT, url).json(&document), &context)
            .await?;
        let written: WriteResponse = response.json().await?;
        debug!(id = %idea.id, rev = %written.rev, "idea written");
        Ok(written.rev)
    }

    async fn delete(&self, id: &str, revision: &str) -> Result<()> {
        let mut url = self.db_url(&[id])?;
        url.query_pairs_mut().append_pair("rev", revision);
        let context = format!("idea {id}");
        let request = self.request(Method::DELETE, url);
        self.send(request, &context).await?;
        debug!(id, "idea deleted");
        Ok(())
    }

    async fn scan(&self, skip: usize, limit: Option<usize>) -> Result<Vec<Idea>> {
        // `_all_docs` counts the design document toward skip and limit, so
        // pages go through a `type == "idea"` selector instead.
        let Some(limit) = limit else {
            let mut url = self.db_url(&["_all_docs"])?;
            url.query_pairs_mut().append_pair("include_docs", "true");
            let rows = self.fetch_rows(url, self.database()).await?;
            return Ok(decode_docs(row_docs(rows)).into_iter().skip(skip).collect());
        };
        let url = self.db_url(&["_find"])?;
        let body = find_page_body(skip, limit);
        let response = self
            .send(self.request(Method::POST, url).json(&body), self.database())
            .await?;
        let found: FindResponse = response.json().await?;
        Ok(decode_docs(found.docs))
    }

    async fn query_index(&self, index: IndexName, query: &ViewQuery) -> Result<Vec<Idea>> {
        let mut url = self.view_url(index)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("include_docs", "true");
            if index.reduce().is_some() {
                pairs.append_pair("reduce", "false");
            }
            match query {
                ViewQuery::All => {}
                ViewQuery::Key(key) => {
                    pairs.append_pair("key", &key.to_query_value());
                }
                ViewQuery::Range { start, end } => {
                    pairs.append_pair("startkey", &start.to_query_value());
                    pairs.append_pair("endkey", &end.to_query_value());
                }
            }
        }
        let context = format!("index {index}");
        let rows = self.fetch_rows(url, &context).await?;
        Ok(decode_docs(row_docs(rows)))
    }

    async fn grouped_counts(&self, index: IndexName) -> Result<Vec<GroupedCount>> {
        if index.reduce().is_none() {
            return Err(AppError::Validation(format!("index {index} has no reduce function")));
        }
        let mut url = self.view_url(index)?;
        url.query_pairs_mut().append_pair("group", "true");
        let context = format!("index {index}");
        let rows = self.fetch_rows(url, &context).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let key = match row.key {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, row.value.as_u64().unwrap_or(0))
            })
            .collect())
    }

    async fn install_indexes(&self) -> Result<()> {
        self.ensure_database().await?;
        let mut document = design_document();
        if let Some(rev) = self.design_revision().await? {
            document["_rev"] = Value::String(rev);
        }
        let url = self.db_url(&["_design", DESIGN_DOC_NAME])?;
        let request = self.request(Method::PUT, url).json(&document);
        self.send(request, DESIGN_DOC_ID).await?;
        info!(database = self.database(), "design document installed");
        Ok(())
    }

    async fn status(&self) -> Result<StoreStatus> {
        let root = self.url(&[])?;
        let info: ServerInfo = self
            .send(self.request(Method::GET, root), "server")
            .await?
            .json()
            .await?;

        let session_url = self.url(&["_session"])?;
        let session: SessionInfo = self
            .send(self.request(Method::GET, session_url), "session")
            .await?
            .json()
            .await?;

        let db_url = self.db_url(&[])?;
        let request = self.request(Method::GET, db_url);
        let database = match self.send(request, self.database()).await {
            Ok(response) => Some(response.json::<DatabaseInfo>().await?),
            Err(AppError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        let indexes_installed = database.is_some() && self.design_revision().await?.is_some();

        Ok(StoreStatus {
            vendor: info
                .vendor
                .and_then(|vendor| vendor.name)
                .unwrap_or_else(|| "CouchDB".into()),
            version: info.version,
            user: session.user_ctx.and_then(|ctx| ctx.name),
            database_exists: database.is_some(),
            doc_count: database.and_then(|db| db.doc_count),
            indexes_installed,
        })
    }
}
