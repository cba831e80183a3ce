//! `check` command: inspect the vector engine.

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::storage::MilvusClient;

/// List collections and report the entity count of the target collection.
pub async fn run_milvus(config: &Config) -> Result<()> {
    let client = MilvusClient::new(&config.milvus).context("Failed to create Milvus client")?;
    let name = &config.milvus.collection;

    let collections = client
        .list_collections()
        .await
        .with_context(|| format!("Failed to reach Milvus at {}", config.milvus.base_url()))?;
    println!("Available collections: {:?}", collections);

    if !collections.iter().any(|c| c == name) {
        bail!("Collection '{}' does not exist", name);
    }

    let entities = client.num_entities(name).await?;
    println!("Number of rows in '{}': {}", name, entities);
    Ok(())
}
