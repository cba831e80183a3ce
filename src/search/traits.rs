//! Search trait and the result shape shared by every backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::SearchError;

/// Backend selector accepted by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Keyword engine
    Solr,
    /// Vector engine
    Milvus,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Solr => "solr",
            Backend::Milvus => "milvus",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = SearchError;

    /// Case-insensitive; anything other than solr or milvus is `InvalidBackend`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solr" => Ok(Backend::Solr),
            "milvus" => Ok(Backend::Milvus),
            _ => Err(SearchError::InvalidBackend(s.to_string())),
        }
    }
}

/// Engine-native document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultId {
    Int(i64),
    Str(String),
}

impl From<i64> for ResultId {
    fn from(id: i64) -> Self {
        ResultId::Int(id)
    }
}

impl From<&str> for ResultId {
    fn from(id: &str) -> Self {
        ResultId::Str(id.to_string())
    }
}

/// One ranked snippet.
///
/// `score` is on the engine's own scale and is not comparable across
/// backends: Solr reports its relevance score, Milvus reports the raw
/// inner-product distance (larger is more similar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: Option<ResultId>,
    pub score: f64,
    pub text: String,
    pub source: String,
}

/// Common trait for both search backends.
#[async_trait]
pub trait Search: Send + Sync {
    /// Return up to `k` results in engine order.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ResultItem>, SearchError>;

    /// Which backend this searcher talks to.
    fn backend(&self) -> Backend;
}
