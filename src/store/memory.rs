// src/store/memory.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;

use super::{QuizStore, ResultStore, UserStore};
use crate::{
    error::AppError,
    models::{
        quiz::{Quiz, QuizQuestion},
        result::{QuizResult, ScoreCard, UpsertedResult},
        user::{NewUser, PasswordResetState, User},
    },
};

/// In-process store with the same constraints as the Postgres schema
/// (unique email, unique (user, quiz) result).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<UserRecord>,
    quizzes: Vec<Quiz>,
    results: Vec<QuizResult>,
}

struct UserRecord {
    user: User,
    email_otp: Option<String>,
    otp_expiry: Option<DateTime<Utc>>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_mut(&mut self, user_id: i64) -> Result<&mut UserRecord, AppError> {
        self.users
            .iter_mut()
            .find(|record| record.user.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    fn has_result(&self, user_id: i64, quiz_id: i64) -> bool {
        self.results
            .iter()
            .any(|r| r.user_id == user_id && r.quiz_id == quiz_id)
    }

    fn with_attempt(&self, quiz: &Quiz) -> Quiz {
        Quiz {
            attempt: self.has_result(quiz.user_id, quiz.id),
            ..quiz.clone()
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // No await happens while the guard is held.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored results for the pair; the schema allows at most one.
    pub fn result_count(&self, user_id: i64, quiz_id: i64) -> usize {
        self.lock()
            .results
            .iter()
            .filter(|r| r.user_id == user_id && r.quiz_id == quiz_id)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|r| r.user.email == user.email) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: inner.next_id(),
            name: user.name,
            email: user.email,
            password: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(UserRecord {
            user: created.clone(),
            email_otp: None,
            otp_expiry: None,
        });

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|r| r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn find_reset_state(&self, email: &str) -> Result<Option<PasswordResetState>, AppError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|r| r.user.email == email)
            .map(|r| PasswordResetState {
                id: r.user.id,
                email_otp: r.email_otp.clone(),
                otp_expiry: r.otp_expiry,
            }))
    }

    async fn set_otp(
        &self,
        user_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut inner = self.lock();
        let record = inner.user_mut(user_id)?;
        record.email_otp = Some(code.to_string());
        record.otp_expiry = Some(expires_at);
        record.user.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut inner = self.lock();
        let record = inner.user_mut(user_id)?;
        record.user.password = password_hash.to_string();
        record.email_otp = None;
        record.otp_expiry = None;
        record.user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn create_quiz(
        &self,
        user_id: i64,
        questions: Vec<QuizQuestion>,
    ) -> Result<Quiz, AppError> {
        let mut inner = self.lock();
        let quiz = Quiz {
            id: inner.next_id(),
            user_id,
            questions: Json(questions),
            attempt: false,
            created_at: Utc::now(),
        };
        inner.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, user_id: i64, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
        let inner = self.lock();
        Ok(inner
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id && q.user_id == user_id)
            .map(|q| inner.with_attempt(q)))
    }

    async fn list_quizzes(&self, user_id: i64) -> Result<Vec<Quiz>, AppError> {
        let inner = self.lock();
        Ok(inner
            .quizzes
            .iter()
            .filter(|q| q.user_id == user_id)
            .map(|q| inner.with_attempt(q))
            .collect())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn upsert_result(
        &self,
        user_id: i64,
        quiz_id: i64,
        card: &ScoreCard,
    ) -> Result<UpsertedResult, AppError> {
        let mut inner = self.lock();
        let now = Utc::now();

        if let Some(existing) = inner
            .results
            .iter_mut()
            .find(|r| r.user_id == user_id && r.quiz_id == quiz_id)
        {
            existing.score = card.score;
            existing.total_questions = card.total_questions;
            existing.percentage = card.percentage.clone();
            existing.updated_at = now;
            return Ok(UpsertedResult {
                result: existing.clone(),
                created: false,
            });
        }

        let result = QuizResult {
            id: inner.next_id(),
            user_id,
            quiz_id,
            score: card.score,
            total_questions: card.total_questions,
            percentage: card.percentage.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.results.push(result.clone());

        Ok(UpsertedResult {
            result,
            created: true,
        })
    }

    async fn find_result(
        &self,
        user_id: i64,
        quiz_id: i64,
    ) -> Result<Option<QuizResult>, AppError> {
        Ok(self
            .lock()
            .results
            .iter()
            .find(|r| r.user_id == user_id && r.quiz_id == quiz_id)
            .cloned())
    }
}
