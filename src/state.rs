//! Shared application state handed to the REST and MCP front ends.

use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::persistence::DocumentStore;
use crate::service::IdeaService;

/// Configuration plus the idea service, built once at startup.
#[derive(Debug)]
pub struct AppState<S> {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Idea operations over the configured store.
    pub service: Arc<IdeaService<S>>,
}

impl<S: DocumentStore> AppState<S> {
    /// Build state around a store.
    #[must_use]
    pub fn new(config: GlobalConfig, store: S) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(IdeaService::new(store)),
        }
    }
}
