//! HTTP routes and router assembly.
//!
//! All API routes live under `/api` and share the rate limiter; CORS and
//! request tracing wrap the whole application.

pub mod agents;
pub mod chat;
pub mod conversations;

use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::api_rate_limiter;
use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(chat::router())
        .merge(agents::router())
        .merge(conversations::router())
        .layer(api_rate_limiter());

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Root endpoint.
///
/// GET /
async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Backend is active" }))
}

/// Health check endpoint.
///
/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}
