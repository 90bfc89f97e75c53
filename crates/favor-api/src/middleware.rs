use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::{AppState, with_db};

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-access-token";

/// The caller, resolved from a verified token. Handlers receive it via
/// `Extension<CurrentUser>`; there is no other way to learn who is calling.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Verify the token in `x-access-token` and resolve its user. The wrapped
/// handler never runs if either step fails.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = {
        let header = req
            .headers()
            .get(TOKEN_HEADER)
            .ok_or(ApiError::TokenMissing)?;
        // Present but not visible ASCII: a garbled token, not a missing one.
        let token = header
            .to_str()
            .map_err(|_| {
                warn!("Non-text token header on {} {}", req.method(), req.uri().path());
                ApiError::TokenInvalid
            })?
            .trim();
        if token.is_empty() {
            return Err(ApiError::TokenMissing);
        }

        state.tokens.verify(token).inspect_err(|e| {
            warn!("Rejected token on {} {}: {:?}", req.method(), req.uri().path(), e);
        })?
    };

    let user = with_db(&state, move |db| db.get_user_by_id(user_id))
        .await?
        .ok_or_else(|| {
            warn!("Token for missing user {}", user_id);
            ApiError::UserNotFound
        })?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
    });
    Ok(next.run(req).await)
}
