// src/models/quiz.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use url::Url;
use validator::Validate;

use crate::error::AppError;

/// Option labels every generated question must carry, in order.
pub const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

pub const PARSE_FAILURE: &str = "Failed to parse quiz data";

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quiz {
    pub id: i64,

    #[serde(rename = "userID")]
    pub user_id: i64,

    /// Generated questions, stored as a JSONB array.
    #[serde(rename = "quiz")]
    pub questions: Json<Vec<QuizQuestion>>,

    /// Whether the owner has a stored result for this quiz.
    /// Never written directly; derived from the results table on read.
    pub attempt: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Correct label per question, in order. An empty answer counts as no
    /// answer and can never be matched.
    pub fn answer_key(&self) -> Vec<Option<&str>> {
        self.questions
            .iter()
            .map(|q| Some(q.answer.as_str()).filter(|a| !a.is_empty()))
            .collect()
    }
}

/// One multiple-choice question as produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,

    /// Option text keyed by label ("A" to "D").
    pub options: BTreeMap<String, String>,

    /// Label of the correct option.
    pub answer: String,

    pub explanation: String,
}

impl QuizQuestion {
    fn normalized(mut self) -> Option<Self> {
        self.question = self.question.trim().to_string();
        self.answer = self.answer.trim().to_ascii_uppercase();
        self.explanation = self.explanation.trim().to_string();

        if self.question.is_empty() || self.explanation.is_empty() {
            return None;
        }
        if self.options.len() != OPTION_LABELS.len() {
            return None;
        }
        let has_all_labels = OPTION_LABELS.iter().all(|label| {
            self.options
                .get(*label)
                .is_some_and(|text| !text.trim().is_empty())
        });
        if !has_all_labels || !OPTION_LABELS.contains(&self.answer.as_str()) {
            return None;
        }

        Some(self)
    }
}

/// Removes a Markdown code fence (```` ```json ```` or bare ```` ``` ````)
/// wrapped around the generator's text.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Parses raw generator output into validated questions.
///
/// Anything other than a non-empty JSON array of well-formed questions is a
/// `DependencyError`.
pub fn parse_generated_questions(raw: &str) -> Result<Vec<QuizQuestion>, AppError> {
    let cleaned = strip_code_fences(raw);

    let questions: Vec<QuizQuestion> = serde_json::from_str(cleaned).map_err(|e| {
        tracing::error!("Error parsing generator response: {}", e);
        AppError::DependencyError(PARSE_FAILURE.to_string())
    })?;

    if questions.is_empty() {
        tracing::error!("Generator returned an empty question list");
        return Err(AppError::DependencyError(PARSE_FAILURE.to_string()));
    }

    questions
        .into_iter()
        .enumerate()
        .map(|(index, question)| {
            question.normalized().ok_or_else(|| {
                tracing::error!("Generated question {} has an invalid shape", index);
                AppError::DependencyError(PARSE_FAILURE.to_string())
            })
        })
        .collect()
}

/// DTO for requesting a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(
        length(min = 1, max = 10, message = "Invalid links provided."),
        custom(function = validate_links)
    )]
    pub links: Vec<String>,
}

/// Every link must be an absolute http(s) URL.
fn validate_links(links: &[String]) -> Result<(), validator::ValidationError> {
    for link in links {
        if link.len() > 2000 {
            return Err(validator::ValidationError::new("link_too_long"));
        }
        match Url::parse(link) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => return Err(validator::ValidationError::new("invalid_link")),
        }
    }
    Ok(())
}

/// DTO for submitting answers.
///
/// `answers[i]` is the label chosen for question `i`; `null` marks an
/// unanswered question.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    #[serde(rename = "quizID")]
    pub quiz_id: i64,
    pub answers: Vec<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_QUESTION: &str = r#"[{
        "question": "Which body sets the repo rate?",
        "options": {"A": "SEBI", "B": "RBI", "C": "NITI Aayog", "D": "Finance Commission"},
        "answer": "B",
        "explanation": "The RBI's Monetary Policy Committee sets the repo rate."
    }]"#;

    #[test]
    fn strips_json_fence() {
        let raw = format!("```json\n{}\n```", ONE_QUESTION);
        assert_eq!(strip_code_fences(&raw), ONE_QUESTION.trim());
    }

    #[test]
    fn strips_bare_fence_and_leaves_plain_text_alone() {
        assert_eq!(strip_code_fences("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  []  "), "[]");
    }

    #[test]
    fn parses_fenced_questions() {
        let raw = format!("```json\n{}\n```", ONE_QUESTION);
        let questions = parse_generated_questions(&raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "B");
        assert_eq!(questions[0].options["C"], "NITI Aayog");
    }

    #[test]
    fn answer_label_is_normalized() {
        let raw = ONE_QUESTION.replace(r#""answer": "B""#, r#""answer": " b ""#);
        let questions = parse_generated_questions(&raw).unwrap();
        assert_eq!(questions[0].answer, "B");
    }

    #[test]
    fn prose_is_rejected() {
        let err = parse_generated_questions("Sure! Here are your questions.").unwrap_err();
        assert!(matches!(err, AppError::DependencyError(ref m) if m == PARSE_FAILURE));
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(parse_generated_questions("[]").is_err());
    }

    #[test]
    fn answer_outside_labels_is_rejected() {
        let raw = ONE_QUESTION.replace(r#""answer": "B""#, r#""answer": "E""#);
        assert!(parse_generated_questions(&raw).is_err());
    }

    #[test]
    fn three_options_are_rejected() {
        let raw = ONE_QUESTION.replace(r#", "D": "Finance Commission""#, "");
        assert!(parse_generated_questions(&raw).is_err());
    }

    #[test]
    fn missing_explanation_is_rejected() {
        let raw = r#"[{"question": "Q", "options": {"A": "1", "B": "2", "C": "3", "D": "4"}, "answer": "A"}]"#;
        assert!(parse_generated_questions(raw).is_err());
    }

    #[test]
    fn links_must_be_http_urls() {
        let ok = GenerateQuizRequest {
            links: vec!["https://example.com/article".to_string()],
        };
        assert!(ok.validate().is_ok());

        let empty = GenerateQuizRequest { links: vec![] };
        assert!(empty.validate().is_err());

        let bad = GenerateQuizRequest {
            links: vec!["ftp://example.com/file".to_string()],
        };
        assert!(bad.validate().is_err());
    }
}
