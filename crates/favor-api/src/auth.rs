use axum::{
    Extension, Json, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};

use favor_types::api::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse};
use favor_types::models::User;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::password::{hash_password, verify_password};
use crate::state::{AppState, with_db};
use crate::validate;

/// POST /users. Uniqueness of name and email is left to the store's
/// constraints, so two racing registrations yield one row and one conflict.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let name = validate::required("name", &req.name)?.to_string();
    let email = validate::required("email", &req.email)?.to_string();
    if req.password.is_empty() {
        return Err(ApiError::MalformedInput("password is required".into()));
    }

    let password_hash = hash_password(req.password).await?;

    let user_id = with_db(&state, move |db| db.create_user(&name, &email, &password_hash)).await?;
    info!("Registered user {}", user_id);

    Ok((StatusCode::CREATED, Json(MessageResponse::new("New user created!"))))
}

/// POST /login. Unknown email and wrong password are indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let email = req.email.trim().to_string();
    let user = with_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::AuthenticationFailed)?;

    if !verify_password(req.password, user.password).await? {
        return Err(ApiError::AuthenticationFailed);
    }

    let token = state.tokens.issue(user.id)?;
    debug!("User {} logged in", user.id);

    Ok(Json(TokenResponse { token }))
}

/// POST /refresh. The presented token stays valid until its own expiry.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// GET /users/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<User> {
    Json(User {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}
