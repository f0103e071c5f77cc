//! Conversation route handlers.
//!
//! The UI persists chat history through these endpoints: the chat endpoints
//! themselves never write, so a failed generation leaves no half-saved
//! exchange behind.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use helpdesk_core::{ConversationId, UserId};

use crate::models::ChatMessage;
use crate::services::{ConversationError, ConversationMessage, ConversationService};
use crate::state::AppState;

/// Build the conversations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(list_conversations))
        .route("/conversations/{id}", get(get_conversation))
        .route("/conversations/messages", post(create_message))
}

// =============================================================================
// Request Types
// =============================================================================

/// Request body for persisting a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageBody {
    /// Conversation to append to; a new or existing one is resolved when
    /// absent.
    pub conversation_id: Option<ConversationId>,
    /// Owner for a new conversation; falls back to the oldest user.
    pub user_id: Option<UserId>,
    /// The message to persist.
    pub message: ChatMessage,
}

// =============================================================================
// Error Handling
// =============================================================================

fn internal_error(message: &'static str, e: &ConversationError) -> Response {
    let event_id = sentry::capture_error(e);
    error!(error = %e, sentry_event_id = %event_id, "{message}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}

// =============================================================================
// Route Handlers
// =============================================================================

/// List recent conversations.
///
/// GET /api/conversations
async fn list_conversations(State(state): State<AppState>) -> Response {
    let service = ConversationService::new(state.pool());

    match service.list_conversations().await {
        Ok(conversations) => Json(conversations).into_response(),
        Err(e) => internal_error("Failed to load conversations", &e),
    }
}

/// Get a conversation with its full history.
///
/// GET /api/conversations/:id
async fn get_conversation(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let service = ConversationService::new(state.pool());

    match service.get_conversation(ConversationId::new(id)).await {
        Ok(Some(conversation)) => Json(conversation).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Conversation not found" })),
        )
            .into_response(),
        Err(e) => internal_error("Failed to load conversation", &e),
    }
}

/// Persist a message, resolving the target conversation first.
///
/// POST /api/conversations/messages
///
/// Returns 201 with `{ conversationId, message }`.
async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(JsonRejection::JsonDataError(e)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request body", "issues": [e.body_text()] })),
            )
                .into_response();
        }
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON body" })),
            )
                .into_response();
        }
    };

    if body.message.content.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid request body",
                "issues": ["message.content must not be empty"],
            })),
        )
            .into_response();
    }

    let service = ConversationService::new(state.pool());

    let conversation = match service
        .ensure_conversation(body.conversation_id, body.user_id)
        .await
    {
        Ok(conversation) => conversation,
        Err(e) => return internal_error("Failed to save message", &e),
    };

    match service
        .append_message(conversation.id, body.message.role, &body.message.content)
        .await
    {
        Ok(message) => (
            StatusCode::CREATED,
            Json(json!({
                "conversationId": conversation.id,
                "message": ConversationMessage::from(message),
            })),
        )
            .into_response(),
        Err(e) => internal_error("Failed to save message", &e),
    }
}
