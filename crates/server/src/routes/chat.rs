//! Chat route handlers.
//!
//! `POST /chat` streams the agent's answer as plain text; `POST /chat/sync`
//! returns the complete answer in one JSON payload. Both validate the
//! message list before anything reaches the model.

use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::models::ChatMessage;
use crate::services::{AgentError, ConversationService, RouterAgent};
use crate::state::AppState;

/// Build the chat router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/sync", post(chat_sync))
        .route("/chat/conversations", get(list_conversations))
}

// =============================================================================
// Request Types & Validation
// =============================================================================

/// Request body for the chat endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessage>,
}

fn invalid_json_body() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid JSON body" })),
    )
        .into_response()
}

fn invalid_request_body(issues: Vec<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid request body", "issues": issues })),
    )
        .into_response()
}

/// Validate a chat request: well-formed JSON, known roles, at least one
/// message, no empty content.
pub(crate) fn parse_chat_body(
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Vec<ChatMessage>, Response> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::JsonDataError(e)) => {
            return Err(invalid_request_body(vec![e.body_text()]));
        }
        Err(_) => return Err(invalid_json_body()),
    };

    if body.messages.is_empty() {
        return Err(invalid_request_body(vec![
            "messages must contain at least 1 message".to_string(),
        ]));
    }

    if let Some(index) = body.messages.iter().position(|m| m.content.is_empty()) {
        return Err(invalid_request_body(vec![format!(
            "messages[{index}].content must not be empty"
        )]));
    }

    Ok(body.messages)
}

// =============================================================================
// Error Handling
// =============================================================================

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        match self {
            Self::QuotaExceeded(quota) => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({
                        "error": "AI quota exceeded. Please try again shortly.",
                        "retryAfterSeconds": quota.retry_after_seconds,
                    })),
                )
                    .into_response();

                if let Some(seconds) = quota.retry_after_seconds
                    && let Ok(value) =
                        header::HeaderValue::from_str(&format!("{}", seconds.ceil() as u64))
                {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }

                response
            }
            Self::Gemini(e) => {
                let event_id = sentry::capture_error(&e);
                error!(error = %e, sentry_event_id = %event_id, "agent request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Run the router agent and stream the answer as plain text.
///
/// POST /api/chat
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let messages = match parse_chat_body(payload) {
        Ok(messages) => messages,
        Err(response) => return response,
    };

    let agent = RouterAgent::new(state.gemini().clone(), state.pool().clone());

    match agent.run_stream(messages).await {
        Ok(stream) => {
            let body = Body::from_stream(
                stream.map(|chunk| chunk.inspect_err(|e| error!(error = %e, "chat stream failed"))),
            );

            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Run the router agent to completion.
///
/// POST /api/chat/sync
///
/// Returns `{ text, finishReason, usage }`.
async fn chat_sync(
    State(state): State<AppState>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let messages = match parse_chat_body(payload) {
        Ok(messages) => messages,
        Err(response) => return response,
    };

    let agent = RouterAgent::new(state.gemini().clone(), state.pool().clone());

    match agent.run_sync(&messages).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List recent conversations for the sidebar.
///
/// GET /api/chat/conversations
async fn list_conversations(State(state): State<AppState>) -> Response {
    let service = ConversationService::new(state.pool());

    match service.list_conversations().await {
        Ok(conversations) => Json(conversations).into_response(),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            error!(error = %e, sentry_event_id = %event_id, "failed to list conversations");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to load conversations" })),
            )
                .into_response()
        }
    }
}
