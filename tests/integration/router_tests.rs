use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ragcompare::config::SolrConfig;
use ragcompare::search::{Backend, KeywordSearcher, Search};
use ragcompare::storage::SolrClient;
use ragcompare::web::{create_router, AppState};

use crate::helpers::mock_search::{FailingSearch, MockSearch};
use crate::helpers::test_utils::create_test_result;

fn ask_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = create_router(state).oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Ok((status, body))
}

fn mock_state() -> (AppState, Arc<MockSearch>, Arc<MockSearch>) {
    let keyword = Arc::new(MockSearch::new(
        Backend::Solr,
        (0..10)
            .map(|i| create_test_result(i, &format!("doc {}", i), "libro.csv", 1.0))
            .collect(),
    ));
    let vector = Arc::new(MockSearch::new(
        Backend::Milvus,
        vec![create_test_result(449, "RAG combina", "libro", 0.75)],
    ));
    let state = AppState::new(
        keyword.clone() as Arc<dyn Search>,
        Some(vector.clone() as Arc<dyn Search>),
    );
    (state, keyword, vector)
}

#[tokio::test]
async fn test_root_reports_running() -> Result<()> {
    let (state, _, _) = mock_state();
    let request = Request::builder().uri("/").body(Body::empty())?;

    let (status, body) = send(state, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "RAG API Solr/Milvus running");
    Ok(())
}

#[tokio::test]
async fn test_invalid_backend_is_rejected_without_search() -> Result<()> {
    let (state, keyword, vector) = mock_state();

    let (status, body) = send(
        state,
        ask_request(json!({"query": "hola", "backend": "vector"})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("solr"));
    assert!(message.contains("milvus"));
    assert_eq!(keyword.calls(), 0);
    assert_eq!(vector.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_backend_is_case_insensitive_and_k_defaults() -> Result<()> {
    let (state, keyword, _) = mock_state();

    let (status, body) = send(
        state,
        ask_request(json!({"query": "¿Qué es RAG?", "backend": "SOLR"})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "solr");
    assert_eq!(body["k"], 5);
    assert_eq!(body["query"], "¿Qué es RAG?");
    assert_eq!(body["results"].as_array().unwrap().len(), 5);
    assert_eq!(keyword.last_call(), Some(("¿Qué es RAG?".to_string(), 5)));
    Ok(())
}

#[tokio::test]
async fn test_non_positive_k_falls_back_to_default() -> Result<()> {
    let (state, keyword, _) = mock_state();

    let (status, body) = send(
        state,
        ask_request(json!({"query": "q", "backend": "solr", "k": 0})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["k"], 5);
    assert_eq!(keyword.last_call().map(|(_, k)| k), Some(5));
    Ok(())
}

#[tokio::test]
async fn test_milvus_dispatch() -> Result<()> {
    let (state, keyword, vector) = mock_state();

    let (status, body) = send(
        state,
        ask_request(json!({"query": "¿Qué es RAG?", "backend": "milvus", "k": 2})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], "milvus");
    assert_eq!(body["k"], 2);
    assert_eq!(body["results"][0]["id"], 449);
    assert_eq!(body["results"][0]["score"], 0.75);
    assert_eq!(body["results"][0]["source"], "libro");
    assert_eq!(keyword.calls(), 0);
    assert_eq!(vector.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_disabled_vector_backend_is_unavailable() -> Result<()> {
    let keyword = Arc::new(MockSearch::new(Backend::Solr, vec![]));
    let state = AppState::new(keyword as Arc<dyn Search>, None);

    let (status, body) = send(
        state,
        ask_request(json!({"query": "q", "backend": "milvus"})),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("disabled"));
    Ok(())
}

#[tokio::test]
async fn test_backend_failure_becomes_500() -> Result<()> {
    let failing = Arc::new(FailingSearch {
        backend: Backend::Solr,
        message: "Error querying Solr: connection refused".to_string(),
    });
    let state = AppState::new(failing as Arc<dyn Search>, None);

    let (status, body) = send(
        state,
        ask_request(json!({"query": "q", "backend": "solr"})),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error querying Solr: connection refused");
    Ok(())
}

#[tokio::test]
async fn test_missing_query_is_client_error() -> Result<()> {
    let (state, keyword, _) = mock_state();

    let (status, _) = send(state, ask_request(json!({"backend": "solr"}))).await?;

    assert!(status.is_client_error());
    assert_eq!(keyword.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() -> Result<()> {
    let (state, _, _) = mock_state();

    let (status, body) = send(
        state.clone(),
        Request::builder().uri("/health").body(Body::empty())?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let response = create_router(state)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_ask_end_to_end_against_solr() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/solr/rag_collection/select"))
        .and(query_param("q", "qué es rag"))
        .and(query_param("rows", "3"))
        .and(query_param("defType", "edismax"))
        .and(query_param("qf", "text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseHeader": {"status": 0},
            "response": {
                "numFound": 2,
                "docs": [
                    {"id": "libro.csv_3", "text": "RAG es...", "source": "libro.csv", "score": 12.345678912345},
                    {"id": "entrevistas.csv_7", "text": ["Retrieval", "augmented"], "score": 2.0}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = SolrConfig {
        url: format!("{}/solr/rag_collection", server.uri()),
        timeout_secs: 5,
    };
    let keyword = KeywordSearcher::new(SolrClient::new(&config)?);
    let state = AppState::new(Arc::new(keyword) as Arc<dyn Search>, None);

    let (status, body) = send(
        state,
        ask_request(json!({"query": "¿Qué es RAG?", "backend": "solr", "k": 3})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["k"], 3);
    assert_eq!(body["query"], "¿Qué es RAG?");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "libro.csv_3");
    assert_eq!(results[0]["score"], 12.345678912345);
    assert_eq!(results[1]["text"], "Retrieval augmented");
    assert_eq!(results[1]["source"], "solr");
    Ok(())
}
