use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragcompare::embeddings::{EmbeddingProvider, MockEmbedder};
use ragcompare::search::{MilvusCollection, ResultId, Search, SearchError, VectorSearcher};
use ragcompare::storage::{MilvusClient, MilvusError};

const COLLECTION: &str = "rag_collection";

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": data}))
}

async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(format!("/v2/vectordb/{}", endpoint)))
        .respond_with(response)
        .mount(server)
        .await;
}

fn searcher(server: &MockServer) -> Result<VectorSearcher> {
    let client = MilvusClient::with_base_url(server.uri(), 5)?;
    let store = Arc::new(MilvusCollection::new(client, COLLECTION, 10));
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbedder::new(384));
    Ok(VectorSearcher::new(store, embedder))
}

async fn requests_to(server: &MockServer, endpoint: &str) -> Vec<Value> {
    let wanted = format!("/v2/vectordb/{}", endpoint);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}

#[tokio::test]
async fn test_vector_search_end_to_end() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, "collections/has", ok(json!({"has": true}))).await;
    mount(&server, "collections/load", ok(json!({}))).await;
    mount(&server, "collections/get_stats", ok(json!({"rowCount": 120}))).await;
    mount(
        &server,
        "entities/search",
        ok(json!([
            {"id": 449, "distance": 0.75, "text": "RAG combina recuperación", "source": "libro"},
            {"id": 12, "distance": 0.5, "text": "otra cosa"}
        ])),
    )
    .await;

    let searcher = searcher(&server)?;
    let results = searcher.search("¿Qué es RAG?", 2).await?;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, Some(ResultId::Int(449)));
    assert_eq!(results[0].score, 0.75);
    assert_eq!(results[0].source, "libro");
    assert_eq!(results[1].source, "milvus");

    let searches = requests_to(&server, "entities/search").await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0]["collectionName"], COLLECTION);
    assert_eq!(searches[0]["limit"], 2);
    assert_eq!(searches[0]["annsField"], "embedding");
    assert_eq!(searches[0]["searchParams"]["metricType"], "IP");
    assert_eq!(searches[0]["searchParams"]["params"]["nprobe"], 10);
    assert_eq!(searches[0]["data"][0].as_array().unwrap().len(), 384);
    Ok(())
}

#[tokio::test]
async fn test_connects_once_and_reloads_every_search() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, "collections/has", ok(json!({"has": true}))).await;
    mount(&server, "collections/load", ok(json!({}))).await;
    mount(&server, "collections/get_stats", ok(json!({"rowCount": 1}))).await;
    mount(&server, "entities/search", ok(json!([]))).await;

    let searcher = searcher(&server)?;
    searcher.search("uno", 3).await?;
    searcher.search("dos", 3).await?;

    assert_eq!(requests_to(&server, "collections/has").await.len(), 1);
    // once while connecting, then once per search
    assert_eq!(requests_to(&server, "collections/load").await.len(), 3);
    assert_eq!(requests_to(&server, "entities/search").await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_empty_collection_skips_search() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, "collections/has", ok(json!({"has": true}))).await;
    mount(&server, "collections/load", ok(json!({}))).await;
    mount(&server, "collections/get_stats", ok(json!({"rowCount": 0}))).await;

    let searcher = searcher(&server)?;
    let results = searcher.search("hola", 5).await?;

    assert!(results.is_empty());
    assert!(requests_to(&server, "entities/search").await.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_index_is_tolerated() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, "collections/has", ok(json!({"has": true}))).await;
    mount(
        &server,
        "collections/load",
        ResponseTemplate::new(200).set_body_json(json!({
            "code": 700,
            "message": "index not found[collection=rag_collection]"
        })),
    )
    .await;
    mount(&server, "collections/get_stats", ok(json!({"rowCount": 3}))).await;
    mount(
        &server,
        "entities/search",
        ok(json!([{"id": 1, "distance": 0.25, "text": "x", "source": "entrevista"}])),
    )
    .await;

    let searcher = searcher(&server)?;
    let results = searcher.search("hola", 5).await?;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "entrevista");
    Ok(())
}

#[tokio::test]
async fn test_missing_collection_is_unavailable_and_retried() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, "collections/has", ok(json!({"has": false}))).await;

    let searcher = searcher(&server)?;
    for _ in 0..2 {
        match searcher.search("hola", 5).await {
            Err(SearchError::BackendUnavailable(message)) => {
                assert!(message.contains(COLLECTION));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    // a failed first connection is not cached
    assert_eq!(requests_to(&server, "collections/has").await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_engine_error_code_is_surfaced() -> Result<()> {
    let server = MockServer::start().await;
    mount(
        &server,
        "collections/get_stats",
        ResponseTemplate::new(200).set_body_json(json!({
            "code": 100,
            "message": "collection not found[collection=nope]"
        })),
    )
    .await;

    let client = MilvusClient::with_base_url(server.uri(), 5)?;
    match client.num_entities("nope").await {
        Err(MilvusError::Engine { code, message }) => {
            assert_eq!(code, 100);
            assert!(message.contains("collection not found"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_list_collections() -> Result<()> {
    let server = MockServer::start().await;
    mount(&server, "collections/list", ok(json!(["rag_collection", "other"]))).await;

    let client = MilvusClient::with_base_url(format!("{}/", server.uri()), 5)?;
    let names = client.list_collections().await?;

    assert_eq!(names, vec!["rag_collection".to_string(), "other".to_string()]);
    Ok(())
}
