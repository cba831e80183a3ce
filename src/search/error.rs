use thiserror::Error;

/// The two failures a query can surface to a client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The backend selector is not one of the supported values.
    #[error("Invalid backend '{0}'. Use 'solr' or 'milvus'.")]
    InvalidBackend(String),

    /// Reaching, loading or querying an external engine failed.
    #[error("{0}")]
    BackendUnavailable(String),
}

impl SearchError {
    pub fn unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        SearchError::BackendUnavailable(format!("{}: {}", context, err))
    }
}
