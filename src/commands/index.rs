//! `index` command: populate one backend from the corpus files.

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::embeddings::FastEmbedProvider;
use crate::indexer::{index_milvus, index_solr};
use crate::storage::MilvusClient;

/// Load the keyword engine. Fails if no file could be indexed.
pub async fn run_solr(config: &Config) -> Result<()> {
    let report = index_solr(config).await?;
    println!("{}", report.summary());

    if report.files_indexed == 0 && report.files_failed > 0 {
        bail!("No corpus file could be indexed into Solr");
    }
    Ok(())
}

/// Rebuild the vector collection.
pub async fn run_milvus(config: &Config) -> Result<()> {
    let client = MilvusClient::new(&config.milvus).context("Failed to create Milvus client")?;
    let embedder = FastEmbedProvider::new(&config.embeddings)?;

    let report = index_milvus(config, &client, &embedder).await?;

    println!(
        "Milvus indexing: {} texts, {} rows inserted, {} entities in '{}'",
        report.texts, report.rows_inserted, report.num_entities, config.milvus.collection
    );
    Ok(())
}
