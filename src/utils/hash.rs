use bcrypt::{hash, verify};

use crate::error::AppError;

/// bcrypt work factor for stored password hashes.
pub const BCRYPT_COST: u32 = 12;

/// Hashes a password with a fresh salt.
///
/// bcrypt is CPU-bound, so the work runs on the blocking thread pool.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();

    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}
