// src/store/mod.rs

//! Persistence seams for the three collections the service owns.
//!
//! Services only see these traits. [`PgStore`] backs them in production,
//! [`MemoryStore`] in tests and local experiments.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        quiz::{Quiz, QuizQuestion},
        result::{QuizResult, ScoreCard, UpsertedResult},
        user::{NewUser, PasswordResetState, User},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_reset_state(&self, email: &str) -> Result<Option<PasswordResetState>, AppError>;

    async fn set_otp(
        &self,
        user_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Stores a new password hash and clears any pending OTP.
    async fn reset_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError>;
}

/// Quiz store. Every read is scoped to the owning user.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn create_quiz(&self, user_id: i64, questions: Vec<QuizQuestion>)
    -> Result<Quiz, AppError>;

    async fn find_quiz(&self, user_id: i64, quiz_id: i64) -> Result<Option<Quiz>, AppError>;

    /// Oldest first.
    async fn list_quizzes(&self, user_id: i64) -> Result<Vec<Quiz>, AppError>;
}

/// Result store, unique on (user, quiz).
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Atomically inserts the result or overwrites the existing row for the pair.
    async fn upsert_result(
        &self,
        user_id: i64,
        quiz_id: i64,
        card: &ScoreCard,
    ) -> Result<UpsertedResult, AppError>;

    async fn find_result(&self, user_id: i64, quiz_id: i64)
    -> Result<Option<QuizResult>, AppError>;
}
