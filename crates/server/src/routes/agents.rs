//! Agent listing route handlers.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::services::agents;
use crate::state::AppState;

/// Build the agents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/agents", get(list_agents))
        .route("/agents/{id}", get(get_agent))
}

/// List all registered agents.
///
/// GET /api/agents
async fn list_agents() -> Json<&'static [agents::AgentInfo]> {
    Json(agents::list())
}

/// Get one agent by ID.
///
/// GET /api/agents/:id
async fn get_agent(Path(id): Path<String>) -> Response {
    agents::get(&id).map_or_else(
        || {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Agent not found" })),
            )
                .into_response()
        },
        |agent| Json(agent).into_response(),
    )
}
