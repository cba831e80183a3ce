//! Vector engine client over the Milvus RESTful v2 API.
//!
//! Every endpoint answers with an envelope `{code, message, data}`; a non-zero
//! `code` is an engine-side failure even when the HTTP status is 200.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::MilvusConfig;
use crate::search::ResultId;

pub const FIELD_ID: &str = "id";
pub const FIELD_EMBEDDING: &str = "embedding";
pub const FIELD_TEXT: &str = "text";
pub const FIELD_SOURCE: &str = "source";

/// VarChar limit of the stored text field. Indexed text is cut well below it.
pub const TEXT_MAX_LENGTH: usize = 5000;

pub const METRIC_TYPE: &str = "IP";
pub const INDEX_TYPE: &str = "IVF_FLAT";

#[derive(Error, Debug)]
pub enum MilvusError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to reach Milvus at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Milvus returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Milvus error {code}: {message}")]
    Engine { code: i64, message: String },

    #[error("unexpected Milvus response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("collection '{0}' does not exist")]
    CollectionNotFound(String),
}

impl MilvusError {
    /// Loading a collection that has no index yet; search still works unindexed.
    pub fn is_index_not_found(&self) -> bool {
        let message = match self {
            MilvusError::Engine { message, .. } => message,
            MilvusError::Status { body, .. } => body,
            _ => return false,
        };
        message.to_lowercase().contains("index not found")
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct HasCollection {
    has: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionStats {
    row_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertResult {
    insert_count: u64,
}

/// A row written to the collection; `id` is assigned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertRow {
    pub embedding: Vec<f32>,
    pub text: String,
    pub source: String,
}

/// One nearest-neighbor hit with its requested output fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub id: ResultId,
    pub distance: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Fixed schema of the RAG collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub dimension: usize,
    pub text_max_length: usize,
    pub source_max_length: usize,
    pub description: String,
}

impl CollectionSchema {
    fn to_json(&self) -> Value {
        json!({
            "autoId": true,
            "enableDynamicField": false,
            "fields": [
                {
                    "fieldName": FIELD_ID,
                    "dataType": "Int64",
                    "isPrimary": true
                },
                {
                    "fieldName": FIELD_EMBEDDING,
                    "dataType": "FloatVector",
                    "elementTypeParams": { "dim": self.dimension.to_string() }
                },
                {
                    "fieldName": FIELD_TEXT,
                    "dataType": "VarChar",
                    "elementTypeParams": { "max_length": self.text_max_length.to_string() }
                },
                {
                    "fieldName": FIELD_SOURCE,
                    "dataType": "VarChar",
                    "elementTypeParams": { "max_length": self.source_max_length.to_string() }
                }
            ]
        })
    }
}

/// Async client for one Milvus deployment.
#[derive(Clone)]
pub struct MilvusClient {
    client: reqwest::Client,
    base_url: String,
}

impl MilvusClient {
    pub fn new(config: &MilvusConfig) -> Result<Self, MilvusError> {
        Self::with_base_url(config.base_url(), config.timeout_secs)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, MilvusError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(MilvusError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<Option<T>, MilvusError> {
        let url = format!("{}/v2/vectordb/{}", self.base_url, endpoint);
        debug!(url = %url, "Calling Milvus");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| MilvusError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MilvusError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| MilvusError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if envelope.code != 0 {
            return Err(MilvusError::Engine {
                code: envelope.code,
                message: envelope.message,
            });
        }

        Ok(envelope.data)
    }

    async fn call_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T, MilvusError> {
        self.call(endpoint, body)
            .await?
            .ok_or_else(|| MilvusError::Decode {
                endpoint: endpoint.to_string(),
                reason: "missing data".to_string(),
            })
    }

    async fn call_unit(&self, endpoint: &str, body: &Value) -> Result<(), MilvusError> {
        self.call::<IgnoredAny>(endpoint, body).await.map(|_| ())
    }

    pub async fn list_collections(&self) -> Result<Vec<String>, MilvusError> {
        Ok(self
            .call("collections/list", &json!({}))
            .await?
            .unwrap_or_default())
    }

    pub async fn has_collection(&self, name: &str) -> Result<bool, MilvusError> {
        let has: HasCollection = self
            .call_data("collections/has", &json!({ "collectionName": name }))
            .await?;
        Ok(has.has)
    }

    pub async fn drop_collection(&self, name: &str) -> Result<(), MilvusError> {
        self.call_unit("collections/drop", &json!({ "collectionName": name }))
            .await
    }

    pub async fn create_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), MilvusError> {
        self.call_unit(
            "collections/create",
            &json!({
                "collectionName": name,
                "description": schema.description,
                "schema": schema.to_json(),
            }),
        )
        .await
    }

    /// Load the collection into query-node memory. Required before search.
    pub async fn load_collection(&self, name: &str) -> Result<(), MilvusError> {
        self.call_unit("collections/load", &json!({ "collectionName": name }))
            .await
    }

    pub async fn flush(&self, name: &str) -> Result<(), MilvusError> {
        self.call_unit("collections/flush", &json!({ "collectionName": name }))
            .await
    }

    pub async fn num_entities(&self, name: &str) -> Result<u64, MilvusError> {
        let stats: CollectionStats = self
            .call_data("collections/get_stats", &json!({ "collectionName": name }))
            .await?;
        Ok(stats.row_count)
    }

    /// Build an IVF_FLAT inner-product index on the embedding field.
    pub async fn create_index(&self, name: &str, nlist: u32) -> Result<(), MilvusError> {
        self.call_unit(
            "indexes/create",
            &json!({
                "collectionName": name,
                "indexParams": [{
                    "fieldName": FIELD_EMBEDDING,
                    "indexName": FIELD_EMBEDDING,
                    "metricType": METRIC_TYPE,
                    "indexType": INDEX_TYPE,
                    "params": { "nlist": nlist }
                }]
            }),
        )
        .await
    }

    /// Insert rows, returning how many the engine accepted.
    pub async fn insert(&self, name: &str, rows: &[InsertRow]) -> Result<u64, MilvusError> {
        let result: InsertResult = self
            .call_data(
                "entities/insert",
                &json!({ "collectionName": name, "data": rows }),
            )
            .await?;
        Ok(result.insert_count)
    }

    /// Inner-product nearest-neighbor search for a single query vector.
    pub async fn search(
        &self,
        name: &str,
        vector: &[f32],
        limit: usize,
        nprobe: u32,
    ) -> Result<Vec<SearchHit>, MilvusError> {
        Ok(self
            .call(
                "entities/search",
                &json!({
                    "collectionName": name,
                    "data": [vector],
                    "annsField": FIELD_EMBEDDING,
                    "limit": limit,
                    "outputFields": [FIELD_TEXT, FIELD_SOURCE],
                    "searchParams": {
                        "metricType": METRIC_TYPE,
                        "params": { "nprobe": nprobe }
                    }
                }),
            )
            .await?
            .unwrap_or_default())
    }
}
