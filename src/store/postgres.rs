// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use super::{QuizStore, ResultStore, UserStore};
use crate::{
    error::AppError,
    models::{
        quiz::{Quiz, QuizQuestion},
        result::{QuizResult, ScoreCard, UpsertedResult},
        user::{NewUser, PasswordResetState, User},
    },
};

/// PostgreSQL-backed implementation of all three stores.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already in use".to_string())
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_reset_state(&self, email: &str) -> Result<Option<PasswordResetState>, AppError> {
        let state = sqlx::query_as::<_, PasswordResetState>(
            "SELECT id, email_otp, otp_expiry FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    async fn set_otp(
        &self,
        user_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_otp = $1, otp_expiry = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(code)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_password(&self, user_id: i64, password_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password = $1, email_otp = NULL, otp_expiry = NULL, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(password_hash)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn create_quiz(
        &self,
        user_id: i64,
        questions: Vec<QuizQuestion>,
    ) -> Result<Quiz, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (user_id, questions)
            VALUES ($1, $2)
            RETURNING id, user_id, questions, FALSE AS attempt, created_at
            "#,
        )
        .bind(user_id)
        .bind(Json(questions))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store quiz: {:?}", e);
            AppError::from(e)
        })?;

        Ok(quiz)
    }

    async fn find_quiz(&self, user_id: i64, quiz_id: i64) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT
                q.id,
                q.user_id,
                q.questions,
                EXISTS (
                    SELECT 1 FROM results r
                    WHERE r.quiz_id = q.id AND r.user_id = q.user_id
                ) AS attempt,
                q.created_at
            FROM quizzes q
            WHERE q.id = $1 AND q.user_id = $2
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    async fn list_quizzes(&self, user_id: i64) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT
                q.id,
                q.user_id,
                q.questions,
                EXISTS (
                    SELECT 1 FROM results r
                    WHERE r.quiz_id = q.id AND r.user_id = q.user_id
                ) AS attempt,
                q.created_at
            FROM quizzes q
            WHERE q.user_id = $1
            ORDER BY q.created_at, q.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quizzes: {:?}", e);
            AppError::from(e)
        })?;

        Ok(quizzes)
    }
}

/// `QuizResult` plus whether the upsert inserted (rather than updated) the row.
#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    result: QuizResult,
    inserted: bool,
}

#[async_trait]
impl ResultStore for PgStore {
    async fn upsert_result(
        &self,
        user_id: i64,
        quiz_id: i64,
        card: &ScoreCard,
    ) -> Result<UpsertedResult, AppError> {
        // xmax is 0 only for a freshly inserted tuple
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO results (user_id, quiz_id, score, total_questions, percentage)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, quiz_id) DO UPDATE SET
                score = EXCLUDED.score,
                total_questions = EXCLUDED.total_questions,
                percentage = EXCLUDED.percentage,
                updated_at = NOW()
            RETURNING
                id, user_id, quiz_id, score, total_questions, percentage,
                created_at, updated_at,
                (xmax = 0) AS inserted
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .bind(card.score)
        .bind(card.total_questions)
        .bind(&card.percentage)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert result: {:?}", e);
            AppError::from(e)
        })?;

        Ok(UpsertedResult {
            result: row.result,
            created: row.inserted,
        })
    }

    async fn find_result(
        &self,
        user_id: i64,
        quiz_id: i64,
    ) -> Result<Option<QuizResult>, AppError> {
        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT
                id, user_id, quiz_id, score, total_questions, percentage,
                created_at, updated_at
            FROM results
            WHERE user_id = $1 AND quiz_id = $2
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result)
    }
}
