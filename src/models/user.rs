// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
///
/// The OTP columns are deliberately absent; they are only read through
/// [`PasswordResetState`].
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    pub name: String,

    /// Unique, stored lowercase.
    pub email: String,

    /// bcrypt password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reduced user view returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Fields needed to check a password-reset code.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetState {
    pub id: i64,
    pub email_otp: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
}

/// Insert payload for the credential store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(
            min = 1,
            max = 100,
            message = "Name length must be between 1 and 100 characters."
        ),
        custom(function = validate_not_blank, message = "Name is required.")
    )]
    pub name: String,
    #[validate(email(message = "Please provide a valid email address."))]
    pub email: String,
    // bcrypt only looks at the first 72 bytes
    #[validate(length(
        min = 6,
        max = 72,
        message = "Password length must be between 6 and 72 characters."
    ))]
    pub password: String,
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, max = 72, message = "Password is required."))]
    pub password: String,
}

/// DTO for requesting a password-reset code.
/// Fields default to empty so a missing value gets the recovery-style 400.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(default)]
    pub email: String,
}

/// DTO for resetting a password with a code.
#[derive(Debug, Deserialize)]
pub struct PasswordRecoveryRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub otp: String,
}

/// Normalized form under which emails are stored and looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
