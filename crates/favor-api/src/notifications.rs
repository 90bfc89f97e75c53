//! Pull-only notifications. They are written by request creation (see
//! `Database::create_request_with_fanout`) and read here.

use axum::{
    Extension, Json,
    extract::rejection::PathRejection,
    extract::{Path, State},
};

use favor_types::api::MessageResponse;
use favor_types::models::Notification;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, with_db};

/// Message delivered to each friend when `requester` posts a request.
pub fn request_created_message(requester: &str) -> String {
    format!("{} created a new request", requester)
}

/// GET /notifications. Newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_notifications(user.id)).await?;
    Ok(Json(rows.into_iter().map(Notification::from).collect()))
}

/// POST /notifications/{id}/read. Someone else's notification is reported
/// as missing.
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = path?;

    if !with_db(&state, move |db| db.mark_notification_read(id, user.id)).await? {
        return Err(ApiError::NotFound("Notification"));
    }
    Ok(Json(MessageResponse::new("Notification marked as read!")))
}
