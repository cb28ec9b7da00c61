// src/services/quiz.rs

use std::sync::Arc;

use crate::{
    clients::QuizGenerator,
    error::AppError,
    models::{
        quiz::{Quiz, parse_generated_questions},
        result::{QuizResult, ScoreCard},
    },
    store::{QuizStore, ResultStore},
};

/// Score returned to the client after a submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub card: ScoreCard,
    /// False when an earlier result for the same quiz was overwritten.
    pub first_attempt: bool,
}

/// Quiz generation, scoring and retrieval.
#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizStore>,
    results: Arc<dyn ResultStore>,
    generator: Arc<dyn QuizGenerator>,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizStore>,
        results: Arc<dyn ResultStore>,
        generator: Arc<dyn QuizGenerator>,
    ) -> Self {
        Self {
            quizzes,
            results,
            generator,
        }
    }

    /// Asks the generator for questions about `links` and stores the quiz.
    pub async fn generate_quiz(&self, user_id: i64, links: &[String]) -> Result<Quiz, AppError> {
        if links.is_empty() {
            return Err(AppError::BadRequest("Invalid links provided.".to_string()));
        }

        let prompt = build_prompt(links);
        let raw = self.generator.generate(&prompt).await?;
        let questions = parse_generated_questions(&raw)?;

        let quiz = self.quizzes.create_quiz(user_id, questions).await?;
        tracing::info!(
            "Generated quiz {} with {} questions for user {}",
            quiz.id,
            quiz.questions.len(),
            user_id
        );

        Ok(quiz)
    }

    /// Scores `answers` positionally against the quiz and records the result.
    pub async fn submit_quiz(
        &self,
        user_id: i64,
        quiz_id: i64,
        answers: &[Option<String>],
    ) -> Result<Submission, AppError> {
        let quiz = self
            .quizzes
            .find_quiz(user_id, quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

        let key = quiz.answer_key();
        let score = score_answers(&key, answers);
        let total = key.len();

        let card = ScoreCard {
            score: to_i32(score)?,
            total_questions: to_i32(total)?,
            percentage: format_percentage(score, total),
        };

        let stored = self.results.upsert_result(user_id, quiz_id, &card).await?;

        Ok(Submission {
            card,
            first_attempt: stored.created,
        })
    }

    pub async fn get_quizzes(&self, user_id: i64) -> Result<Vec<Quiz>, AppError> {
        let quizzes = self.quizzes.list_quizzes(user_id).await?;

        if quizzes.is_empty() {
            return Err(AppError::NotFound(
                "No quizzes found for this user.".to_string(),
            ));
        }

        Ok(quizzes)
    }

    pub async fn get_result(&self, user_id: i64, quiz_id: i64) -> Result<QuizResult, AppError> {
        self.results
            .find_result(user_id, quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Result not found".to_string()))
    }
}

fn to_i32(value: usize) -> Result<i32, AppError> {
    i32::try_from(value).map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Prompt asking for 2-3 MCQs per article as a bare JSON array.
pub fn build_prompt(links: &[String]) -> String {
    let mut prompt = String::from(
        "Please read these articles one by one and generate real exam level multiple choice \
         questions in an Indian competitive exam context. For each article write 2 to 3 questions. \
         Every question must have exactly four options labeled A, B, C and D, exactly one correct \
         option, and a short explanation of why it is correct.\n\
         Respond with only a JSON array, no prose, where each element has this shape:\n\
         {\"question\": \"...\", \"options\": {\"A\": \"...\", \"B\": \"...\", \"C\": \"...\", \"D\": \"...\"}, \
         \"answer\": \"A\", \"explanation\": \"...\"}\n",
    );

    for (i, link) in links.iter().enumerate() {
        prompt.push_str(&format!("\nArticle {}: {}", i + 1, link));
    }

    prompt
}

/// Counts positions where the submitted label equals the correct one.
/// Positions past the end of either slice are ignored; `None` never matches.
pub fn score_answers(key: &[Option<&str>], answers: &[Option<String>]) -> usize {
    key.iter()
        .zip(answers)
        .filter(|(correct, given)| match (correct, given) {
            (Some(correct), Some(given)) => *correct == given.as_str(),
            _ => false,
        })
        .count()
}

/// `score / total` as a percentage with two decimals, e.g. "66.67%".
/// Halves round up ("3.13%" for 1/32). A quiz without questions scores "0.00%".
pub fn format_percentage(score: usize, total: usize) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    // hundredths of a percent, rounded half up in integer arithmetic
    let (score, total) = (score as u64, total as u64);
    let hundredths = (score * 20_000 + total) / (2 * total);
    format!("{}.{:02}%", hundredths / 100, hundredths % 100)
}
