// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'results' table in the database.
/// One row per (user, quiz) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizResult {
    pub id: i64,

    #[serde(rename = "userID")]
    pub user_id: i64,

    #[serde(rename = "quizID")]
    pub quiz_id: i64,

    pub score: i32,

    #[serde(rename = "totalQuestions")]
    pub total_questions: i32,

    /// Two decimals with a trailing '%', e.g. "66.67%".
    pub percentage: String,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Values written by a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: i32,
    pub total_questions: i32,
    pub percentage: String,
}

/// Outcome of an upsert: the stored row and whether it was newly created.
#[derive(Debug, Clone)]
pub struct UpsertedResult {
    pub result: QuizResult,
    pub created: bool,
}
