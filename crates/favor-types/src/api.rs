use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Token claims --

/// Session token claims. Shared by the issuer and the auth middleware so
/// both sides agree on the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub iat: usize,
    pub exp: usize,
    /// Random per issue, so two tokens minted in the same second differ.
    pub jti: Uuid,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain acknowledgement body, e.g. `{"message": "User updated!"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
}

// -- Marketplace --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateServiceRequest {
    pub description: String,
    pub category: String,
    pub location: String,
    pub price: f64,
    /// Must be `YYYY-MM-DD HH:MM:SS`.
    pub date_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOfferRequest {
    pub request_id: i64,
    pub price: f64,
}

// -- Social --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFriendshipRequest {
    pub friend_id: i64,
}
