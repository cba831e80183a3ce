//! HTTP query router.
//!
//! Exposes `POST /ask`, which sends a query to the keyword or the vector
//! backend and returns a uniform result envelope, plus liveness, health and
//! metrics endpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragcompare::web::{AppState, WebServer};
//!
//! let server = WebServer::new(state);
//! server.start("0.0.0.0", 8000).await?;
//! ```

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// The router with CORS and request tracing applied.
///
/// Request spans and response events are emitted at INFO so they pass the
/// default `tower_http=info` filter.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    create_router(state).layer(trace).layer(cors)
}

/// HTTP server wrapping the router with CORS and request tracing.
pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self, host: &str, port: u16) -> Result<()> {
        let app = build_app(self.state);

        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind to {}:{}", host, port))?;

        info!("Query router listening on http://{}:{}", host, port);

        axum::serve(listener, app)
            .await
            .with_context(|| "Web server failed")?;

        Ok(())
    }
}
