use anyhow::{Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::info;

use super::l2_normalize;
use super::provider::EmbeddingProvider;
use crate::config::EmbeddingsConfig;
use crate::metrics::EMBEDDING_LATENCY;

/// A loaded sentence-embedding model.
pub trait TextEmbedder: Send + Sync {
    fn embed(&self, texts: Vec<String>, batch_size: Option<usize>) -> Result<Vec<Vec<f32>>>;
}

impl TextEmbedder for TextEmbedding {
    fn embed(&self, texts: Vec<String>, batch_size: Option<usize>) -> Result<Vec<Vec<f32>>> {
        TextEmbedding::embed(self, texts, batch_size)
    }
}

/// Blocking model constructor, run at most once per successful load.
pub type ModelLoader = Arc<dyn Fn() -> Result<Arc<dyn TextEmbedder>> + Send + Sync>;

/// FastEmbed-backed provider.
///
/// The model is loaded on first use and kept for the life of the process.
/// Concurrent first callers wait on the same load; a failed load is retried
/// by the next caller.
pub struct FastEmbedProvider {
    config: EmbeddingsConfig,
    loader: ModelLoader,
    model: OnceCell<Arc<dyn TextEmbedder>>,
}

impl FastEmbedProvider {
    /// Validate the configured model name. Does not load anything.
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let model_type = Self::parse_model_name(&config.model)?;
        let cache_dir = config.cache_dir.clone();

        let loader: ModelLoader = Arc::new(move || {
            let mut options =
                InitOptions::new(model_type.clone()).with_show_download_progress(false);
            if let Some(dir) = cache_dir.clone() {
                options = options.with_cache_dir(dir);
            }
            let model = TextEmbedding::try_new(options)?;
            Ok(Arc::new(model) as Arc<dyn TextEmbedder>)
        });

        Ok(Self::with_loader(config, loader))
    }

    /// Build a provider over a custom model constructor.
    pub fn with_loader(config: &EmbeddingsConfig, loader: ModelLoader) -> Self {
        Self {
            config: config.clone(),
            loader,
            model: OnceCell::new(),
        }
    }

    /// Parse model name string to fastembed EmbeddingModel enum
    fn parse_model_name(name: &str) -> Result<EmbeddingModel> {
        match name {
            "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2"
            | "paraphrase-multilingual-MiniLM-L12-v2"
            | "paraphrase-multilingual-minilm-l12-v2" => Ok(EmbeddingModel::ParaphraseMLMiniLML12V2),
            "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" | "all-minilm-l6-v2" => {
                Ok(EmbeddingModel::AllMiniLML6V2)
            }
            "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" | "bge-small" => {
                Ok(EmbeddingModel::BGESmallENV15)
            }
            // An unknown model would silently produce vectors from a different space
            _ => anyhow::bail!("Unsupported embedding model '{}'", name),
        }
    }

    /// Return the loaded model, loading it on the first call.
    async fn model(&self) -> Result<Arc<dyn TextEmbedder>> {
        self.model
            .get_or_try_init(|| async {
                let loader = Arc::clone(&self.loader);
                let name = self.config.model.clone();

                info!(model = %name, "Loading embedding model");
                let start = Instant::now();

                let model = tokio::task::spawn_blocking(move || loader())
                    .await
                    .context("Embedding model loading task failed")?
                    .with_context(|| format!("Failed to initialize embedding model: {}", name))?;

                info!(
                    model = %name,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Embedding model loaded"
                );
                Ok::<_, anyhow::Error>(model)
            })
            .await
            .cloned()
    }

    /// Load the model now instead of on the first query.
    pub async fn warm_up(&self) -> Result<()> {
        self.model().await.map(|_| ())
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let start = Instant::now();

        let texts = texts.to_vec();
        let batch_size = self.config.batch_size;

        let mut embeddings = tokio::task::spawn_blocking(move || {
            model
                .embed(texts, Some(batch_size))
                .context("Failed to generate embeddings")
        })
        .await
        .context("FastEmbed processing task failed")??;

        for vector in embeddings.iter_mut() {
            if vector.len() != self.config.dimension {
                anyhow::bail!(
                    "Model produced {}-dimensional vectors, expected {}",
                    vector.len(),
                    self.config.dimension
                );
            }
            l2_normalize(vector);
        }

        EMBEDDING_LATENCY.observe(start.elapsed().as_secs_f64());

        Ok(embeddings)
    }

    fn embedding_dimension(&self) -> usize {
        self.config.dimension
    }

    fn provider_name(&self) -> &'static str {
        "fastembed"
    }
}
