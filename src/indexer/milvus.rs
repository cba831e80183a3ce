//! Rebuild the vector collection from the corpus files.
//!
//! The run is destructive: the collection is dropped and recreated every time.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::corpus::{clean_texts, read_rows, truncate_chars};
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::storage::milvus::TEXT_MAX_LENGTH;
use crate::storage::{CollectionSchema, InsertRow, MilvusClient};

/// Rows per insert request.
const INSERT_BATCH_SIZE: usize = 500;

/// Outcome of one vector indexing run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MilvusIndexReport {
    pub texts: usize,
    pub rows_inserted: u64,
    pub num_entities: u64,
}

/// Texts and their source labels, ready to embed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreparedCorpus {
    pub texts: Vec<String>,
    pub sources: Vec<String>,
}

/// Load, clean and label every configured corpus file. Unreadable files are skipped.
pub fn prepare_corpus(config: &Config) -> PreparedCorpus {
    let mut corpus = PreparedCorpus::default();

    for file in &config.corpus.files {
        info!(path = %file.path.display(), "Reading dataset");

        let rows = match read_rows(&file.path) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Skipping corpus file");
                continue;
            }
        };

        let texts = clean_texts(rows, config.corpus.max_text_chars);
        let source = truncate_chars(&file.source, config.corpus.max_source_chars).to_string();

        info!(path = %file.path.display(), texts = texts.len(), "Valid texts");
        if let Some((chars, bytes)) = max_lengths(&texts) {
            info!(max_chars = chars, max_bytes = bytes, "Longest text");
        }

        corpus.sources.extend(std::iter::repeat(source).take(texts.len()));
        corpus.texts.extend(texts);
    }

    corpus
}

fn max_lengths(texts: &[String]) -> Option<(usize, usize)> {
    let chars = texts.iter().map(|t| t.chars().count()).max()?;
    let bytes = texts.iter().map(|t| t.len()).max()?;
    Some((chars, bytes))
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] Embedding: [{bar:40.cyan/blue}] {pos}/{len}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

/// Drop and recreate the collection, embed the corpus, insert, index and load.
pub async fn index_milvus(
    config: &Config,
    client: &MilvusClient,
    embedder: &dyn EmbeddingProvider,
) -> Result<MilvusIndexReport> {
    let name = config.milvus.collection.as_str();

    if client.has_collection(name).await? {
        info!(collection = name, "Dropping existing collection");
        client.drop_collection(name).await?;
    }

    let schema = CollectionSchema {
        dimension: config.embeddings.dimension,
        text_max_length: TEXT_MAX_LENGTH,
        source_max_length: config.corpus.max_source_chars,
        description: "RAG collection".to_string(),
    };
    client
        .create_collection(name, &schema)
        .await
        .with_context(|| format!("Failed to create collection '{}'", name))?;
    info!(collection = name, dimension = schema.dimension, "Created collection");

    let corpus = prepare_corpus(config);
    let mut report = MilvusIndexReport {
        texts: corpus.texts.len(),
        ..Default::default()
    };

    if corpus.texts.is_empty() {
        warn!("No texts to index");
        return Ok(report);
    }

    if let Some((chars, bytes)) = max_lengths(&corpus.texts) {
        info!(max_chars = chars, max_bytes = bytes, "Global longest text");
    }

    info!(
        texts = corpus.texts.len(),
        model = embedder.provider_name(),
        "Generating embeddings"
    );

    let bar = progress_bar(corpus.texts.len() as u64);
    let batch_size = config.embeddings.batch_size.max(1);
    let mut embeddings = Vec::with_capacity(corpus.texts.len());
    for batch in corpus.texts.chunks(batch_size) {
        let vectors = embedder
            .embed(batch)
            .await
            .context("Failed to generate embeddings")?;
        embeddings.extend(vectors);
        bar.inc(batch.len() as u64);
    }
    bar.finish_and_clear();

    let rows: Vec<InsertRow> = embeddings
        .into_iter()
        .zip(corpus.texts)
        .zip(corpus.sources)
        .map(|((embedding, text), source)| InsertRow {
            embedding,
            text,
            source,
        })
        .collect();

    info!(rows = rows.len(), collection = name, "Inserting rows");
    for batch in rows.chunks(INSERT_BATCH_SIZE) {
        report.rows_inserted += client
            .insert(name, batch)
            .await
            .context("Failed to insert rows")?;
    }

    client.flush(name).await.context("Failed to flush collection")?;

    info!(collection = name, nlist = config.milvus.nlist, "Creating IVF_FLAT index on 'embedding'");
    client
        .create_index(name, config.milvus.nlist)
        .await
        .context("Failed to create index")?;

    info!(collection = name, "Loading collection into memory");
    client
        .load_collection(name)
        .await
        .context("Failed to load collection")?;

    report.num_entities = client.num_entities(name).await?;
    info!(
        collection = name,
        inserted = report.rows_inserted,
        entities = report.num_entities,
        "Vector indexing completed"
    );

    Ok(report)
}
