// src/services/mod.rs

//! Business rules, free of HTTP types. Handlers translate requests into these
//! calls and the returned `AppError`s into status codes.

pub mod auth;
pub mod quiz;

pub use auth::AuthService;
pub use quiz::QuizService;
