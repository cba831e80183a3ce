use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::error::SearchError;
use super::traits::{Backend, ResultItem, Search};
use crate::embeddings::EmbeddingProvider;
use crate::storage::{MilvusClient, MilvusError, SearchHit};

/// Operations the vector searcher needs from a collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection, for logs and messages
    fn collection(&self) -> &str;

    /// Verify the collection is reachable and exists.
    async fn connect(&self) -> Result<(), MilvusError>;

    /// Load the collection into memory; idempotent.
    async fn load(&self) -> Result<(), MilvusError>;

    async fn num_entities(&self) -> Result<u64, MilvusError>;

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, MilvusError>;
}

/// A Milvus collection addressed by name.
pub struct MilvusCollection {
    client: MilvusClient,
    name: String,
    nprobe: u32,
}

impl MilvusCollection {
    pub fn new(client: MilvusClient, name: impl Into<String>, nprobe: u32) -> Self {
        Self {
            client,
            name: name.into(),
            nprobe,
        }
    }
}

#[async_trait]
impl VectorStore for MilvusCollection {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<(), MilvusError> {
        if self.client.has_collection(&self.name).await? {
            Ok(())
        } else {
            Err(MilvusError::CollectionNotFound(self.name.clone()))
        }
    }

    async fn load(&self) -> Result<(), MilvusError> {
        self.client.load_collection(&self.name).await
    }

    async fn num_entities(&self) -> Result<u64, MilvusError> {
        self.client.num_entities(&self.name).await
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>, MilvusError> {
        self.client
            .search(&self.name, vector, limit, self.nprobe)
            .await
    }
}

/// Vector search against a Milvus collection.
///
/// The collection is connected and loaded once, on the first request; later
/// requests reuse it but reload before every search because the engine may
/// release the collection on its own.
pub struct VectorSearcher {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    ready: OnceCell<()>,
}

impl VectorSearcher {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            ready: OnceCell::new(),
        }
    }

    /// Connect and load on first use. Concurrent first callers share one attempt;
    /// a failed attempt leaves the searcher unconnected for the next request.
    async fn ensure_ready(&self) -> Result<(), SearchError> {
        self.ready
            .get_or_try_init(|| async {
                let name = self.store.collection();
                info!(collection = name, "Connecting to Milvus");

                self.store.connect().await.map_err(|e| {
                    SearchError::unavailable(
                        &format!("Error connecting to Milvus collection '{}'", name),
                        e,
                    )
                })?;
                self.load_tolerant().await?;

                let entities = self.store.num_entities().await.map_err(|e| {
                    SearchError::unavailable("Error reading Milvus collection stats", e)
                })?;
                info!(collection = name, entities = entities, "Milvus collection ready");
                Ok::<(), SearchError>(())
            })
            .await
            .map(|_| ())
    }

    /// Load the collection, accepting a missing index as a degraded mode.
    async fn load_tolerant(&self) -> Result<(), SearchError> {
        match self.store.load().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_index_not_found() => {
                warn!(
                    collection = self.store.collection(),
                    error = %e,
                    "Collection has no index, searching without it"
                );
                Ok(())
            }
            Err(e) => Err(SearchError::unavailable(
                &format!("Error loading Milvus collection '{}'", self.store.collection()),
                e,
            )),
        }
    }
}

#[async_trait]
impl Search for VectorSearcher {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<ResultItem>, SearchError> {
        self.ensure_ready().await?;

        let entities = self
            .store
            .num_entities()
            .await
            .map_err(|e| SearchError::unavailable("Error reading Milvus collection stats", e))?;
        if entities == 0 {
            debug!(collection = self.store.collection(), "Collection is empty");
            return Ok(Vec::new());
        }

        let vector = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| SearchError::unavailable("Error generating query embedding", e))?;

        self.load_tolerant().await?;

        let hits = self
            .store
            .search(&vector, k)
            .await
            .map_err(|e| SearchError::unavailable("Error querying Milvus", e))?;

        let results: Vec<ResultItem> = hits.into_iter().map(hit_to_result).collect();

        info!(
            search_type = "milvus",
            results = results.len(),
            "Vector search completed"
        );

        Ok(results)
    }

    fn backend(&self) -> Backend {
        Backend::Milvus
    }
}

/// The inner-product distance is passed through as the score (larger is closer).
fn hit_to_result(hit: SearchHit) -> ResultItem {
    ResultItem {
        id: Some(hit.id),
        score: hit.distance,
        text: hit.text,
        source: hit.source.unwrap_or_else(|| Backend::Milvus.to_string()),
    }
}
