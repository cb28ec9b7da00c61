// src/handlers/auth.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::{AppError, RecoveryError},
    models::user::{LoginRequest, PasswordRecoveryRequest, RegisterRequest, SendOtpRequest},
    services::AuthService,
    utils::extract::ValidatedJson,
};

/// Registers a new user.
///
/// Returns 201 Created with the user (excluding password) and a bearer token.
pub async fn register(
    State(auth): State<AuthService>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let registered = auth.register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": registered.user,
            "token": registered.token,
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(auth): State<AuthService>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let logged_in = auth.login(payload).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": logged_in.user,
        "token": logged_in.token,
    })))
}

/// Mails a password-reset code to a registered address.
pub async fn send_otp_password(
    State(auth): State<AuthService>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RecoveryError> {
    let Json(payload) = payload.map_err(AppError::from)?;
    let message = auth.send_password_reset_otp(&payload.email).await?;

    Ok(Json(json!({
        "success": true,
        "message": message,
    })))
}

/// Sets a new password after checking the mailed code.
pub async fn recovery_password(
    State(auth): State<AuthService>,
    payload: Result<Json<PasswordRecoveryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, RecoveryError> {
    let Json(payload) = payload.map_err(AppError::from)?;
    auth.reset_password(payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Password updated successfully",
    })))
}
