use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    clients::{Mailer, QuizGenerator},
    config::Config,
    services::{AuthService, QuizService},
    store::{QuizStore, ResultStore, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
    pub quiz: QuizService,
}

impl AppState {
    /// Wires the services on top of one store backing all three collections.
    pub fn new<S>(
        config: Config,
        store: Arc<S>,
        generator: Arc<dyn QuizGenerator>,
        mailer: Arc<dyn Mailer>,
    ) -> Self
    where
        S: UserStore + QuizStore + ResultStore + 'static,
    {
        let auth = AuthService::new(
            store.clone(),
            mailer,
            config.jwt_secret.clone(),
            config.jwt_expiration,
        );
        let quiz = QuizService::new(store.clone(), store, generator);

        Self { config, auth, quiz }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for QuizService {
    fn from_ref(state: &AppState) -> Self {
        state.quiz.clone()
    }
}
