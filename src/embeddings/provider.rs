use anyhow::Result;
use async_trait::async_trait;

/// Core trait for embedding providers.
///
/// Implementations must return L2-normalized vectors: the vector engine ranks
/// by inner product, so query-time and index-time vectors have to share the
/// same normalization.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate embedding for a single query
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding generated for query"))
    }

    /// Dimension of the produced vectors
    fn embedding_dimension(&self) -> usize;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
