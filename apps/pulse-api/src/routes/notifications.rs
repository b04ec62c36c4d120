//! Inbound notification submissions from collaborator CRUD actions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use pulse_common::protocol::NotificationEvent;
use serde::Serialize;

use crate::error::{ApiError, FieldError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", post(submit_notification))
}

// ---------------------------------------------------------------------------
// POST /api/v1/notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    /// Number of live sessions the push was addressed to.
    pub delivered: usize,
}

async fn submit_notification(
    State(state): State<AppState>,
    Json(event): Json<NotificationEvent>,
) -> Result<(StatusCode, Json<DeliveryResponse>), ApiError> {
    let mut errors = Vec::new();
    if event.target_user_id.trim().is_empty() {
        errors.push(FieldError {
            field: "targetUserId".to_string(),
            message: "A target user id is required".to_string(),
        });
    }
    if event.title.trim().is_empty() {
        errors.push(FieldError {
            field: "title".to_string(),
            message: "A title is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let delivered = state.fanout.deliver(&event).await;
    Ok((StatusCode::ACCEPTED, Json(DeliveryResponse { delivered })))
}
