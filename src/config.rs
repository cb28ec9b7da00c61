// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Settings for the Gemini text-generation API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL up to and including the API version, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Settings for the SMTP relay used to deliver OTP mails.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address; defaults to the SMTP username.
    pub from_email: String,
    pub from_name: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub gemini: GeminiConfig,
    pub smtp: SmtpConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = required("DATABASE_URL");
        let jwt_secret = required("JWT_SECRET");
        let jwt_expiration = parsed_or("JWT_EXPIRATION", 86_400);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = parsed_or("PORT", 5000);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let gemini = GeminiConfig {
            api_key: required("GEMINI_API_KEY"),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            timeout_secs: parsed_or("GENERATION_TIMEOUT_SECS", 60),
        };

        let smtp_username = required("SMTP_USERNAME");
        let smtp = SmtpConfig {
            host: required("SMTP_HOST"),
            port: parsed_or("SMTP_PORT", 587),
            password: required("SMTP_PASSWORD"),
            from_email: env::var("MAIL_FROM").unwrap_or_else(|_| smtp_username.clone()),
            username: smtp_username,
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Current Affairs-AI".to_string()),
            timeout_secs: parsed_or("MAIL_TIMEOUT_SECS", 15),
        };

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            cors_origins,
            gemini,
            smtp,
        }
    }
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{} must be set", name))
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid number, got '{}'", name, raw)),
        Err(_) => default,
    }
}
