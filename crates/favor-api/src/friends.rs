use axum::{
    Extension, Json, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use favor_types::api::CreateFriendshipRequest;
use favor_types::models::{Friend, Friendship};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, with_db};

/// POST /friendships. One-directional; the other side is not asked and no
/// reciprocal edge is written. Repeating the call adds another edge.
pub async fn create_friendship(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateFriendshipRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let friend_id = req.friend_id;

    let row = with_db(&state, move |db| db.create_friendship(user.id, friend_id))
        .await
        .map_err(|e| e.naming("User"))?;

    debug!("User {} friended user {}", row.user_id, row.friend_id);

    Ok((StatusCode::CREATED, Json(Friendship::from(row))))
}

/// GET /friends
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Friend>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_friends(user.id)).await?;
    Ok(Json(rows.into_iter().map(Friend::from).collect()))
}
