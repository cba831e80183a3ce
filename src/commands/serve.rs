//! `serve` command: start the HTTP query router.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::embeddings::FastEmbedProvider;
use crate::search::{KeywordSearcher, MilvusCollection, Search, VectorSearcher};
use crate::storage::{MilvusClient, SolrClient};
use crate::web::{AppState, WebServer};

/// Build both searchers from configuration.
///
/// Nothing is contacted here: the vector collection and the embedding model
/// are set up on the first vector query.
pub fn build_state(config: &Config) -> Result<AppState> {
    let solr = SolrClient::new(&config.solr).context("Failed to create Solr client")?;
    let keyword: Arc<dyn Search> = Arc::new(KeywordSearcher::new(solr));

    let vector: Option<Arc<dyn Search>> = if config.milvus.enabled {
        let client = MilvusClient::new(&config.milvus).context("Failed to create Milvus client")?;
        let store = Arc::new(MilvusCollection::new(
            client,
            config.milvus.collection.clone(),
            config.milvus.nprobe,
        ));
        let embedder = Arc::new(
            FastEmbedProvider::new(&config.embeddings)
                .context("Failed to configure embedding provider")?,
        );
        let searcher: Arc<dyn Search> = Arc::new(VectorSearcher::new(store, embedder));
        Some(searcher)
    } else {
        warn!("Milvus backend disabled; requests for it will fail");
        None
    };

    Ok(AppState::new(keyword, vector))
}

/// Run the query router until the process is stopped.
pub async fn run(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!(
        solr = %config.solr.url,
        milvus = %config.milvus.base_url(),
        milvus_enabled = config.milvus.enabled,
        collection = %config.milvus.collection,
        "Starting query router"
    );

    let state = build_state(config)?;
    WebServer::new(state).start(&host, port).await
}
