//! Online-roster query and client liveness ping.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use pulse_common::protocol::RosterEntry;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presence", get(list_online))
        .route("/presence/ping", post(ping))
}

// ---------------------------------------------------------------------------
// GET /api/v1/presence
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub users: Vec<RosterEntry>,
}

async fn list_online(State(state): State<AppState>) -> Json<PresenceResponse> {
    let users = state.presence.current_roster().await;
    Json(PresenceResponse { users })
}

// ---------------------------------------------------------------------------
// POST /api/v1/presence/ping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRequest {
    pub user_id: Option<String>,
}

async fn ping(
    State(state): State<AppState>,
    Json(body): Json<PingRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = body.user_id.as_deref().map(str::trim).unwrap_or_default();
    if user_id.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "userId".to_string(),
            message: "A user id is required".to_string(),
        }]));
    }

    state.last_seen.touch(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
