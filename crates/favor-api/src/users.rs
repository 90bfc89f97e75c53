use axum::{
    Extension, Json,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
};
use tracing::{info, warn};

use favor_types::api::{MessageResponse, UpdateUserRequest};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::password::hash_password;
use crate::state::{AppState, with_db};
use crate::validate;

// Any authenticated user may update or delete any profile. Cross-user edits
// are logged but not refused.

/// PUT /users/{id}. The password is re-hashed only when supplied.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(target_id) = path?;
    let Json(req) = payload?;

    let name = validate::required("name", &req.name)?.to_string();
    let email = validate::required("email", &req.email)?.to_string();
    let password_hash = match req.password {
        Some(password) if password.is_empty() => {
            return Err(ApiError::MalformedInput("password must not be empty".into()));
        }
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    if caller.id != target_id {
        warn!("User {} is updating profile of user {}", caller.id, target_id);
    }

    let updated = with_db(&state, move |db| {
        db.update_user(target_id, &name, &email, password_hash.as_deref())
    })
    .await?;
    if !updated {
        return Err(ApiError::NotFound("User"));
    }

    info!("Updated user {}", target_id);
    Ok(Json(MessageResponse::new("User updated!")))
}

/// DELETE /users/{id}. Everything the user owns goes with them.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CurrentUser>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(target_id) = path?;

    if caller.id != target_id {
        warn!("User {} is deleting user {}", caller.id, target_id);
    }

    if !with_db(&state, move |db| db.delete_user(target_id)).await? {
        return Err(ApiError::NotFound("User"));
    }

    info!("Deleted user {}", target_id);
    Ok(Json(MessageResponse::new("User deleted!")))
}
