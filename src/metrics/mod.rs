//! Prometheus metrics for the query router
//!
//! Per-backend request and error counters plus latency histograms for
//! searches and query embedding.

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Once;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Total number of search requests, by backend
    pub static ref SEARCH_REQUESTS: CounterVec = CounterVec::new(
        Opts::new(
            "ragcompare_search_requests_total",
            "Total number of search requests"
        ),
        &["backend"]
    ).expect("Failed to create SEARCH_REQUESTS counter");

    /// Total number of failed search requests, by backend
    pub static ref SEARCH_ERRORS: CounterVec = CounterVec::new(
        Opts::new(
            "ragcompare_search_errors_total",
            "Total number of failed search requests"
        ),
        &["backend"]
    ).expect("Failed to create SEARCH_ERRORS counter");

    /// Search latency in seconds, by backend
    pub static ref SEARCH_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ragcompare_search_latency_seconds",
            "Search request latency in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["backend"]
    ).expect("Failed to create SEARCH_LATENCY histogram");

    /// Query embedding latency in seconds
    pub static ref EMBEDDING_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ragcompare_embedding_latency_seconds",
            "Embedding generation latency in seconds"
        ).buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0])
    ).expect("Failed to create EMBEDDING_LATENCY histogram");
}

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Safe to call more than once; only the first call registers.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(SEARCH_REQUESTS.clone()))
            .expect("Failed to register SEARCH_REQUESTS");
        REGISTRY
            .register(Box::new(SEARCH_ERRORS.clone()))
            .expect("Failed to register SEARCH_ERRORS");
        REGISTRY
            .register(Box::new(SEARCH_LATENCY.clone()))
            .expect("Failed to register SEARCH_LATENCY");
        REGISTRY
            .register(Box::new(EMBEDDING_LATENCY.clone()))
            .expect("Failed to register EMBEDDING_LATENCY");
    });
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns an empty string if encoding fails.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}
