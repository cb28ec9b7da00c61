// src/services/auth.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    clients::Mailer,
    error::AppError,
    models::user::{
        LoginRequest, NewUser, PasswordRecoveryRequest, RegisterRequest, User, UserSummary,
        normalize_email,
    },
    store::UserStore,
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
        otp::{generate_otp, otp_expiry, otp_is_valid},
    },
};

/// Shared by every login failure so the response never reveals which part
/// of the credentials was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// A user view paired with a freshly signed bearer token.
#[derive(Debug)]
pub struct Authenticated<U> {
    pub user: U,
    pub token: String,
}

/// Registration, login and OTP-based password recovery.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    jwt_secret: String,
    jwt_expiration: u64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        jwt_secret: String,
        jwt_expiration: u64,
    ) -> Self {
        Self {
            users,
            mailer,
            jwt_secret,
            jwt_expiration,
        }
    }

    /// Creates an account and signs a token for it.
    ///
    /// The request is expected to have passed validation already.
    pub async fn register(&self, req: RegisterRequest) -> Result<Authenticated<User>, AppError> {
        let email = normalize_email(&req.email);

        // Checked up front so a duplicate does not pay for a bcrypt round;
        // the unique index still catches concurrent registrations.
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let password_hash = hash_password(&req.password).await?;

        let user = self
            .users
            .create_user(NewUser {
                name: req.name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        let token = sign_jwt(user.id, &self.jwt_secret, self.jwt_expiration)?;
        tracing::info!("Registered user {}", user.id);

        Ok(Authenticated { user, token })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<Authenticated<UserSummary>, AppError> {
        let email = normalize_email(&req.email);

        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&req.password, &user.password).await? {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        let token = sign_jwt(user.id, &self.jwt_secret, self.jwt_expiration)?;

        Ok(Authenticated {
            user: user.into(),
            token,
        })
    }

    /// Issues a fresh reset code, stores it with a 15 minute expiry and mails it.
    /// Returns the acknowledgement message.
    pub async fn send_password_reset_otp(&self, email: &str) -> Result<String, AppError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::BadRequest(
                "Please provide an email address".to_string(),
            ));
        }

        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("Email not registered".to_string()))?;

        let otp = generate_otp();
        self.users
            .set_otp(user.id, &otp, otp_expiry(Utc::now()))
            .await?;

        self.mailer
            .send_password_reset_otp(&user.email, &user.name, &otp)
            .await?;

        Ok(format!("OTP sent successfully to {}", user.email))
    }

    pub async fn reset_password(&self, req: PasswordRecoveryRequest) -> Result<(), AppError> {
        let email = normalize_email(&req.email);
        let otp = req.otp.as_str();

        if email.is_empty() || req.password.is_empty() || otp.is_empty() {
            return Err(AppError::BadRequest(
                "Email, password, and OTP are required".to_string(),
            ));
        }
        // counted in characters, like the registration check
        let length = req.password.chars().count();
        if !(6..=72).contains(&length) {
            return Err(AppError::BadRequest(
                "Password length must be between 6 and 72 characters.".to_string(),
            ));
        }

        let state = self
            .users
            .find_reset_state(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !otp_is_valid(state.email_otp.as_deref(), state.otp_expiry, otp, Utc::now()) {
            return Err(AppError::BadRequest("Invalid or expired OTP".to_string()));
        }

        let password_hash = hash_password(&req.password).await?;
        self.users.reset_password(state.id, &password_hash).await?;
        tracing::info!("Password reset for user {}", state.id);

        Ok(())
    }
}
