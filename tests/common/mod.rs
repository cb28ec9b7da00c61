// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quizgen::{
    clients::{Mailer, QuizGenerator},
    config::{Config, GeminiConfig, SmtpConfig},
    error::AppError,
    routes,
    state::AppState,
    store::MemoryStore,
};

pub const VALID_QUIZ: &str = r#"```json
[
  {"question": "Which body sets the repo rate?", "options": {"A": "RBI", "B": "SEBI", "C": "NITI Aayog", "D": "CAG"}, "answer": "A", "explanation": "The RBI's MPC sets it."},
  {"question": "Which article covers the Finance Commission?", "options": {"A": "Art. 110", "B": "Art. 280", "C": "Art. 324", "D": "Art. 356"}, "answer": "B", "explanation": "Article 280."},
  {"question": "Where is the Kaziranga park?", "options": {"A": "Kerala", "B": "Gujarat", "C": "Assam", "D": "Odisha"}, "answer": "C", "explanation": "It is in Assam."}
]
```"#;

/// Generator stub whose reply the test can swap.
pub struct FakeGenerator {
    reply: Mutex<String>,
}

impl FakeGenerator {
    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = reply.to_string();
    }
}

#[async_trait]
impl QuizGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, AppError> {
        Ok(self.reply.lock().unwrap().clone())
    }
}

/// Mailer stub that keeps every (recipient, code) pair.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset_otp(
        &self,
        to: &str,
        _name: &str,
        otp: &str,
    ) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), otp.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<FakeGenerator>,
    pub mailer: Arc<RecordingMailer>,
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        gemini: GeminiConfig {
            api_key: "unused".to_string(),
            model: "gemini-2.0-flash".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            username: "unused".to_string(),
            password: "unused".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Current Affairs-AI".to_string(),
            timeout_secs: 1,
        },
    }
}

/// Spawns the app on a random port with in-memory collaborators.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let generator = Arc::new(FakeGenerator {
        reply: Mutex::new(VALID_QUIZ.to_string()),
    });
    let mailer = Arc::new(RecordingMailer::default());

    let state = AppState::new(
        test_config(),
        store.clone(),
        generator.clone(),
        mailer.clone(),
    );
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        store,
        generator,
        mailer,
    }
}

pub fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers a fresh user and returns (email, token).
    pub async fn register(&self, password: &str) -> (String, String) {
        let email = unique_email();
        let response = self
            .post_json(
                "/auth/register",
                serde_json::json!({ "name": "Test User", "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);

        let body: serde_json::Value = response.json().await.unwrap();
        let token = body["token"].as_str().expect("Token not found").to_string();
        (email, token)
    }
}
