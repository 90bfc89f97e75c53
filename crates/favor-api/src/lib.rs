pub mod auth;
pub mod error;
pub mod friends;
pub mod middleware;
pub mod notifications;
pub mod offers;
pub mod password;
pub mod requests;
pub mod state;
pub mod token;
pub mod users;
mod validate;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use favor_types::api::MessageResponse;

use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full HTTP surface. Everything except registration, login and
/// the liveness check sits behind the token middleware.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/users", post(auth::register))
        .route("/login", post(auth::login))
        .route("/test", get(health));

    let protected_routes = Router::new()
        .route("/refresh", post(auth::refresh))
        .route("/users/me", get(auth::me))
        .route("/users/{id}", put(users::update_user).delete(users::delete_user))
        .route("/requests", post(requests::create_request).get(requests::list_requests))
        .route("/requests/{id}/offers", get(offers::list_offers))
        .route("/offers", post(offers::create_offer))
        .route("/offers/{id}/accept", post(offers::accept_offer))
        .route("/friendships", post(friends::create_friendship))
        .route("/friends", get(friends::list_friends))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// GET /test: liveness check.
pub async fn health() -> Json<MessageResponse> {
    Json(MessageResponse::new("The server is running"))
}
