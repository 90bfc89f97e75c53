//! Argon2id password hashing. Hashing is memory-hard and slow on purpose, so
//! both entry points run on the blocking pool.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::error;

use crate::error::ApiError;
use crate::state::blocking;

/// Hash with Argon2id and a fresh random salt. Returns a PHC string.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    blocking(move || hash(&password)).await
}

/// `false` for a wrong password and for a stored hash that does not parse.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, ApiError> {
    blocking(move || Ok(verify(&password, &stored_hash))).await
}

fn hash(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hash failed: {}", e)))
}

fn verify(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Stored password hash is corrupt: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
