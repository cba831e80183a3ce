//! Application state for the query router.

use std::sync::Arc;

use crate::search::{Backend, Search, SearchError};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Keyword backend
    pub keyword: Arc<dyn Search>,
    /// Vector backend; `None` when it is disabled in configuration
    pub vector: Option<Arc<dyn Search>>,
}

impl AppState {
    pub fn new(keyword: Arc<dyn Search>, vector: Option<Arc<dyn Search>>) -> Self {
        Self { keyword, vector }
    }

    /// Pick the searcher for a backend.
    pub fn searcher(&self, backend: Backend) -> Result<Arc<dyn Search>, SearchError> {
        match backend {
            Backend::Solr => Ok(Arc::clone(&self.keyword)),
            Backend::Milvus => self.vector.clone().ok_or_else(|| {
                SearchError::BackendUnavailable(
                    "Milvus backend is disabled in this deployment (set milvus.enabled = true)"
                        .to_string(),
                )
            }),
        }
    }
}
