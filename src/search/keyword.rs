use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::error::SearchError;
use super::normalize::normalize_query;
use super::traits::{Backend, ResultId, ResultItem, Search};
use crate::storage::{SolrClient, SolrDoc};

/// Score reported when the engine leaves it out.
const DEFAULT_SCORE: f64 = 1.0;

/// Keyword search against a Solr core.
pub struct KeywordSearcher {
    client: SolrClient,
}

impl KeywordSearcher {
    pub fn new(client: SolrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Search for KeywordSearcher {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ResultItem>, SearchError> {
        let cleaned = normalize_query(query);
        debug!(query = query, cleaned = %cleaned, "Normalized keyword query");

        let response = self
            .client
            .select(&cleaned, k)
            .await
            .map_err(|e| SearchError::unavailable("Error querying Solr", e))?;

        let results: Vec<ResultItem> = response
            .response
            .docs
            .into_iter()
            .map(doc_to_result)
            .collect();

        info!(
            search_type = "solr",
            results = results.len(),
            "Keyword search completed"
        );

        Ok(results)
    }

    fn backend(&self) -> Backend {
        Backend::Solr
    }
}

fn doc_to_result(doc: SolrDoc) -> ResultItem {
    ResultItem {
        id: doc.id.and_then(value_to_id),
        score: doc.score.unwrap_or(DEFAULT_SCORE),
        text: doc.text.map(flatten_field).unwrap_or_default(),
        source: doc
            .source
            .map(flatten_field)
            .unwrap_or_else(|| Backend::Solr.to_string()),
    }
}

/// Join a possibly multi-valued field into one space-separated string.
fn flatten_field(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(flatten_field)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

fn value_to_id(value: Value) -> Option<ResultId> {
    match value {
        Value::Null => None,
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(ResultId::Int(i)),
            None => Some(ResultId::Str(n.to_string())),
        },
        other => Some(ResultId::Str(flatten_field(other))),
    }
}
