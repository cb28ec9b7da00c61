// src/clients/mod.rs

//! Outbound collaborators: the text generator and the mail relay.

pub mod gemini;
pub mod mailer;

pub use gemini::{GeminiClient, QuizGenerator};
pub use mailer::{Mailer, SmtpMailer};
