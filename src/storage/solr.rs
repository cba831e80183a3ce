//! Keyword engine client over Solr's HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::SolrConfig;

/// Fields requested from `/select`.
const FIELD_LIST: &str = "id,text,source,score";

#[derive(Error, Debug)]
pub enum SolrError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Body of a `/select` response; only the document list is read.
#[derive(Debug, Default, Deserialize)]
pub struct SelectResponse {
    #[serde(default)]
    pub response: DocList,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocList {
    #[serde(default)]
    pub docs: Vec<SolrDoc>,
}

/// A returned document. Schemaless cores may hand back list-valued fields,
/// so everything but the score stays as raw JSON.
#[derive(Debug, Default, Deserialize)]
pub struct SolrDoc {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub source: Option<Value>,
}

/// A document submitted through `/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolrDocument {
    pub id: String,
    pub text: String,
    pub source: String,
}

/// Thin async client bound to one Solr core.
#[derive(Clone)]
pub struct SolrClient {
    client: reqwest::Client,
    config: SolrConfig,
}

impl SolrClient {
    pub fn new(config: &SolrConfig) -> Result<Self, SolrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SolrError::Client)?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// edismax query over the `text` field, `rows` documents, JSON response.
    pub async fn select(&self, q: &str, rows: usize) -> Result<SelectResponse, SolrError> {
        let url = self.config.select_url();
        let rows = rows.to_string();
        let params = [
            ("q", q),
            ("defType", "edismax"),
            ("qf", "text"),
            ("rows", rows.as_str()),
            ("wt", "json"),
            ("fl", FIELD_LIST),
        ];

        debug!(url = %url, q = q, rows = %rows, "Querying Solr");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| SolrError::Transport {
                url: url.clone(),
                source,
            })?;

        let response = check_status(&url, response).await?;

        response
            .json::<SelectResponse>()
            .await
            .map_err(|source| SolrError::Decode { url, source })
    }

    /// Bulk-submit documents with `commit=true`.
    pub async fn update(&self, docs: &[SolrDocument]) -> Result<(), SolrError> {
        let url = self.config.update_url();

        let response = self
            .client
            .post(&url)
            .json(docs)
            .send()
            .await
            .map_err(|source| SolrError::Transport {
                url: url.clone(),
                source,
            })?;

        check_status(&url, response).await?;
        Ok(())
    }
}

async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, SolrError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SolrError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}
