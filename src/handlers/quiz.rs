// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::quiz::{GenerateQuizRequest, SubmitQuizRequest},
    services::QuizService,
    utils::{extract::ValidatedJson, jwt::Claims},
};

/// Generates a quiz from the submitted article links.
///
/// * Extracts the User ID from the token claims.
/// * Asks the generator for questions and validates the reply.
/// * Stores and returns the new quiz (201).
pub async fn generate_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let created = quiz.generate_quiz(user_id, &req.links).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz generated successfully.",
            "quiz": created,
        })),
    ))
}

/// Scores the submitted answers and upserts the caller's result for the quiz.
pub async fn submit_quiz(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let submission = quiz.submit_quiz(user_id, req.quiz_id, &req.answers).await?;

    let message = if submission.first_attempt {
        "Quiz submitted successfully"
    } else {
        "Quiz submission updated successfully"
    };

    Ok(Json(json!({
        "message": message,
        "score": submission.card.score,
        "totalQuestions": submission.card.total_questions,
        "percentage": submission.card.percentage,
    })))
}

/// Lists every quiz owned by the caller.
pub async fn get_quizzes(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let quizzes = quiz.get_quizzes(user_id).await?;

    Ok(Json(json!({ "quizzes": quizzes })))
}

/// Returns the caller's stored result for one quiz.
pub async fn get_result(
    State(quiz): State<QuizService>,
    Extension(claims): Extension<Claims>,
    quiz_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(quiz_id) = quiz_id?;
    let user_id = claims.user_id()?;
    let result = quiz.get_result(user_id, quiz_id).await?;

    Ok(Json(json!({
        "message": "Result retrieved successfully",
        "result": result,
    })))
}
