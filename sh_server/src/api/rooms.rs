//! Room listing endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::{AppState, request_id::RequestId};

/// List live rooms.
///
/// # Response
///
/// `200 OK` with the rooms sorted by name:
///
/// ```json
/// {"rooms": [{"name": "R1", "player_count": 3, "max_players": 5, "phase": "in_progress"}]}
/// ```
///
/// `503 Service Unavailable` if the session actor has stopped.
pub async fn list_rooms(State(state): State<AppState>, request_id: RequestId) -> impl IntoResponse {
    match state.sessions.list_rooms().await {
        Ok(rooms) => {
            tracing::debug!(request_id = %request_id, count = rooms.len(), "Listed rooms");
            (StatusCode::OK, Json(json!({ "rooms": rooms })))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, "Failed to list rooms: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
