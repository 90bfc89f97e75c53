//! Stateless session tokens (HS256 JWT).
//!
//! A token carries the user id and its own expiry. Nothing is recorded
//! server-side, so a token stays valid until `exp` even if the account
//! changes; there is no revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use uuid::Uuid;

use favor_types::api::Claims;

use crate::error::ApiError;

pub const DEFAULT_TTL_HOURS: i64 = 24;

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no grace period.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp().max(0) as usize,
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token encode failed: {}", e)))
    }

    /// Check signature and expiry and return the embedded user id. Does not
    /// consult the store.
    pub fn verify(&self, token: &str) -> Result<i64, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::TokenInvalid,
            })
    }
}
