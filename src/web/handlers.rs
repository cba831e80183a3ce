//! HTTP request handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info};

use super::state::AppState;
use crate::metrics::{self, SEARCH_ERRORS, SEARCH_LATENCY, SEARCH_REQUESTS};
use crate::search::{Backend, ResultItem, SearchError};

/// Result count used when `k` is absent or not positive.
pub const DEFAULT_K: usize = 5;

/// `POST /ask` payload.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The natural-language query
    pub query: String,
    /// "solr" or "milvus", any case
    pub backend: String,
    /// Maximum number of results
    #[serde(default)]
    pub k: Option<i64>,
}

/// `POST /ask` response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub backend: Backend,
    /// The query as received, before any normalization
    pub query: String,
    pub k: usize,
    pub results: Vec<ResultItem>,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchError::InvalidBackend(_) => StatusCode::BAD_REQUEST,
            SearchError::BackendUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Absent, zero and negative values all fall back to `DEFAULT_K`.
pub fn effective_k(k: Option<i64>) -> usize {
    match k {
        Some(k) if k > 0 => k as usize,
        _ => DEFAULT_K,
    }
}

/// Liveness payload.
///
/// GET /
pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        status: "ok".to_string(),
        message: "RAG API Solr/Milvus running".to_string(),
    })
}

/// Route a query to one backend.
///
/// POST /ask
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, SearchError> {
    let backend: Backend = request.backend.parse()?;
    let k = effective_k(request.k);
    let searcher = state.searcher(backend)?;

    let label = backend.as_str();
    SEARCH_REQUESTS.with_label_values(&[label]).inc();
    let start = Instant::now();

    info!(backend = label, query = %request.query, k = k, "Processing ask request");

    let outcome = searcher.search(&request.query, k).await;
    SEARCH_LATENCY
        .with_label_values(&[label])
        .observe(start.elapsed().as_secs_f64());

    let results = outcome.inspect_err(|e| {
        SEARCH_ERRORS.with_label_values(&[label]).inc();
        error!(backend = label, error = %e, "Search failed");
    })?;

    info!(
        backend = label,
        results = results.len(),
        took_ms = start.elapsed().as_millis() as u64,
        "Ask request completed"
    );

    Ok(Json(AskResponse {
        backend,
        query: request.query,
        k,
        results,
    }))
}

/// Health check endpoint.
///
/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Prometheus metrics endpoint.
///
/// GET /metrics
pub async fn metrics_handler() -> impl IntoResponse {
    let output = metrics::gather_metrics();
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], output)
}
