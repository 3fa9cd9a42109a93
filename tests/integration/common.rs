//! Shared fixtures

use std::sync::Arc;

use hello_books_server::{
    config::{AdminConfig, AppConfig, DatabaseConfig},
    models::{book::CreateBook, session::Caller, Book, User},
    repository::Repository,
    services::{password::CredentialVerifier, Services},
    AppResult, AppState,
};

pub const ADMIN_EMAIL: &str = "admin@hellobooks.dev";
pub const ADMIN_PASSWORD: &str = "Admin1234";

/// Stores passwords with a marker prefix; keeps the suite fast without argon2
pub struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn hash(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{}", password))
    }

    fn verify(&self, password: &str, digest: &str) -> AppResult<bool> {
        Ok(digest == format!("plain:{}", password))
    }
}

pub async fn test_state() -> AppState {
    let config = AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };

    let repository = Repository::connect(&config.database).await.unwrap();
    let services = Services::with_verifier(repository, &config.auth, Arc::new(PlainVerifier));

    services
        .users
        .ensure_admin(&AdminConfig {
            username: "admin".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .await
        .unwrap();

    AppState {
        services: Arc::new(services),
    }
}

/// Registered sessions for `email`, read straight from the store
pub async fn session_rows(state: &AppState, email: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM active_tokens WHERE user_email = ?")
        .bind(email)
        .fetch_one(&state.services.repository.pool)
        .await
        .unwrap()
}

/// Loans not yet returned, read straight from the store
pub async fn open_loan_rows(state: &AppState) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM borrowing_history WHERE returned = 0")
        .fetch_one(&state.services.repository.pool)
        .await
        .unwrap()
}

pub async fn add_book(state: &AppState, title: &str) -> Book {
    state
        .services
        .catalog
        .create_book(CreateBook {
            title: title.to_string(),
            author: "Various".to_string(),
            description: format!("{} description", title),
        })
        .await
        .unwrap()
}

pub async fn add_reader(state: &AppState, username: &str) -> User {
    state
        .services
        .repository
        .users
        .create(username, &format!("{}@hellobooks.dev", username), "plain:Secret123", false)
        .await
        .unwrap()
}

pub fn caller_for(user: &User) -> Caller {
    Caller {
        user_id: user.id,
        email: user.email.clone(),
        is_admin: user.is_admin,
        jti: format!("jti-{}", user.id),
    }
}
