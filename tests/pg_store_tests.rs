// tests/pg_store_tests.rs

// These run against a real Postgres taken from DATABASE_URL and are skipped
// when the variable is unset.

use std::collections::BTreeMap;

use quizgen::{
    error::AppError,
    models::{
        quiz::QuizQuestion,
        result::ScoreCard,
        user::{NewUser, User},
    },
    store::{PgStore, QuizStore, ResultStore, UserStore},
};
use sqlx::postgres::PgPoolOptions;

/// Connects and migrates, or returns `None` when no database is configured.
async fn pg_store() -> Option<PgStore> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(PgStore::new(pool))
}

async fn seed_user(store: &PgStore) -> User {
    store
        .create_user(NewUser {
            name: "Store Test".to_string(),
            email: format!("pg_{}@example.com", uuid::Uuid::new_v4()),
            password_hash: "$2b$12$not-a-real-hash".to_string(),
        })
        .await
        .expect("Failed to seed user")
}

fn question(answer: &str) -> QuizQuestion {
    let options: BTreeMap<String, String> = ["A", "B", "C", "D"]
        .iter()
        .map(|label| (label.to_string(), format!("Option {}", label)))
        .collect();

    QuizQuestion {
        question: "Which body sets the repo rate?".to_string(),
        options,
        answer: answer.to_string(),
        explanation: "The RBI's MPC sets it.".to_string(),
    }
}

fn card(score: i32, total: i32, percentage: &str) -> ScoreCard {
    ScoreCard {
        score,
        total_questions: total,
        percentage: percentage.to_string(),
    }
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user = seed_user(&store).await;

    let err = store
        .create_user(NewUser {
            name: "Someone Else".to_string(),
            email: user.email.clone(),
            password_hash: "$2b$12$another-hash".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(ref m) if m == "Email already in use"));
}

#[tokio::test]
async fn second_upsert_updates_the_same_row() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user = seed_user(&store).await;
    let quiz = store
        .create_quiz(user.id, vec![question("A"), question("B"), question("C")])
        .await
        .unwrap();

    let first = store
        .upsert_result(user.id, quiz.id, &card(2, 3, "66.67%"))
        .await
        .unwrap();
    assert!(first.created);

    let second = store
        .upsert_result(user.id, quiz.id, &card(3, 3, "100.00%"))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.result.id, first.result.id);
    assert_eq!(second.result.score, 3);
    assert_eq!(second.result.percentage, "100.00%");
    assert!(second.result.updated_at >= first.result.updated_at);

    let stored = store
        .find_result(user.id, quiz.id)
        .await
        .unwrap()
        .expect("result stored");
    assert_eq!(stored.id, first.result.id);
    assert_eq!(stored.score, 3);
    assert_eq!(stored.total_questions, 3);
}

#[tokio::test]
async fn concurrent_first_submissions_leave_one_result() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user = seed_user(&store).await;
    let quiz = store
        .create_quiz(user.id, vec![question("A")])
        .await
        .unwrap();

    let card_a = card(1, 1, "100.00%");
    let card_b = card(0, 1, "0.00%");
    let (a, b) = tokio::join!(
        store.upsert_result(user.id, quiz.id, &card_a),
        store.upsert_result(user.id, quiz.id, &card_b),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.result.id, b.result.id);
    assert!(a.created ^ b.created);
}

#[tokio::test]
async fn attempt_is_derived_from_results() {
    let Some(store) = pg_store().await else {
        return;
    };
    let user = seed_user(&store).await;
    let quiz = store
        .create_quiz(user.id, vec![question("A"), question("B")])
        .await
        .unwrap();
    assert!(!quiz.attempt);
    assert_eq!(quiz.questions.len(), 2);

    let before = store.find_quiz(user.id, quiz.id).await.unwrap().unwrap();
    assert!(!before.attempt);

    store
        .upsert_result(user.id, quiz.id, &card(1, 2, "50.00%"))
        .await
        .unwrap();

    let after = store.find_quiz(user.id, quiz.id).await.unwrap().unwrap();
    assert!(after.attempt);
    let listed = store.list_quizzes(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].attempt);
    assert_eq!(listed[0].questions[1].answer, "B");
}

#[tokio::test]
async fn quizzes_are_scoped_to_their_owner() {
    let Some(store) = pg_store().await else {
        return;
    };
    let owner = seed_user(&store).await;
    let other = seed_user(&store).await;
    let quiz = store
        .create_quiz(owner.id, vec![question("A")])
        .await
        .unwrap();

    assert!(store.find_quiz(other.id, quiz.id).await.unwrap().is_none());
    assert!(store.list_quizzes(other.id).await.unwrap().is_empty());
    assert!(store.find_result(owner.id, quiz.id).await.unwrap().is_none());
}
