use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use favor_db::DbError;
use favor_types::api::MessageResponse;

/// Every failure a handler can return. Auth failures share generic messages
/// so callers learn nothing about why a credential was refused.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Login failed!")]
    AuthenticationFailed,

    #[error("Token is missing!")]
    TokenMissing,

    #[error("Token has expired!")]
    TokenExpired,

    #[error("Token is invalid!")]
    TokenInvalid,

    /// Token verified but its user no longer exists.
    #[error("Token is invalid!")]
    UserNotFound,

    #[error("User already exists!")]
    DuplicateIdentity,

    #[error("{0} not found!")]
    NotFound(&'static str),

    #[error("Not allowed!")]
    Forbidden,

    #[error("{0}")]
    MalformedInput(String),

    /// Detail is logged, never sent.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationFailed
            | ApiError::TokenMissing
            | ApiError::TokenExpired
            | ApiError::TokenInvalid
            | ApiError::UserNotFound => StatusCode::UNAUTHORIZED,
            ApiError::DuplicateIdentity => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the entity name to a `NotFound` produced by a dangling
    /// reference; other errors pass through.
    pub fn naming(self, what: &'static str) -> Self {
        match self {
            ApiError::NotFound(_) => ApiError::NotFound(what),
            other => other,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref detail) = self {
            error!("Internal error: {}", detail);
        }
        (self.status(), Json(MessageResponse::new(self.to_string()))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate => ApiError::DuplicateIdentity,
            DbError::MissingReference => ApiError::NotFound("Resource"),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedInput(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::MalformedInput(rejection.body_text())
    }
}
