//! Login, logout, password reset and the token gate

use hello_books_server::{services::sessions::LoginOutcome, AppError};

use crate::common::{add_reader, caller_for, session_rows, test_state};

const EMAIL: &str = "brian@hellobooks.dev";
const PASSWORD: &str = "Secret123";

#[tokio::test]
async fn test_login_twice_returns_the_live_token() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let first = sessions.login(EMAIL, PASSWORD).await.unwrap();
    assert!(matches!(first, LoginOutcome::Created { .. }));

    let second = sessions.login(EMAIL, PASSWORD).await.unwrap();
    assert!(matches!(second, LoginOutcome::AlreadyActive { .. }));
    assert_eq!(first.token(), second.token());
    assert_eq!(session_rows(&state, EMAIL).await, 1);
}

#[tokio::test]
async fn test_concurrent_logins_leave_one_session() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let (a, b) = tokio::join!(sessions.login(EMAIL, PASSWORD), sessions.login(EMAIL, PASSWORD));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.token(), b.token());
    assert_eq!(session_rows(&state, EMAIL).await, 1);
}

#[tokio::test]
async fn test_dead_session_is_replaced_on_login() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    state
        .services
        .repository
        .sessions
        .open(EMAIL, "not-a-token", "stale-jti")
        .await
        .unwrap();

    let outcome = state.services.sessions.login(EMAIL, PASSWORD).await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Created { .. }));

    let stored = state.services.repository.sessions.find(EMAIL).await.unwrap();
    assert_eq!(stored.access_token, outcome.token());
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let token = sessions.login(EMAIL, PASSWORD).await.unwrap().token().to_string();
    let caller = sessions.authenticate(&token).await.unwrap();

    sessions.logout(&caller, EMAIL).await.unwrap();

    assert!(state.services.repository.revocations.is_revoked(&caller.jti).await.unwrap());
    assert_eq!(session_rows(&state, EMAIL).await, 0);
    assert!(matches!(
        sessions.authenticate(&token).await,
        Err(AppError::Authentication(_))
    ));

    // A revoked token stays revoked and cannot log out twice
    assert!(matches!(
        sessions.logout(&caller, EMAIL).await,
        Err(AppError::Authentication(_))
    ));

    let again = sessions.login(EMAIL, PASSWORD).await.unwrap();
    assert!(matches!(again, LoginOutcome::Created { .. }));
    assert_ne!(again.token(), token);
}

#[tokio::test]
async fn test_logout_for_another_email_is_refused() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let token = sessions.login(EMAIL, PASSWORD).await.unwrap().token().to_string();
    let caller = sessions.authenticate(&token).await.unwrap();

    let result = sessions.logout(&caller, "amina@hellobooks.dev").await;
    assert!(matches!(result, Err(AppError::Authentication(_))));
    assert!(sessions.authenticate(&token).await.is_ok());
}

#[tokio::test]
async fn test_revocation_stands_when_session_close_fails() {
    let state = test_state().await;
    let reader = add_reader(&state, "brian").await;
    let caller = caller_for(&reader);
    assert_eq!(session_rows(&state, EMAIL).await, 0);

    let result = state.services.sessions.logout(&caller, EMAIL).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    assert!(state
        .services
        .repository
        .revocations
        .is_revoked(&caller.jti)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revocation_is_idempotent() {
    let state = test_state().await;
    let revocations = &state.services.repository.revocations;

    assert!(!revocations.is_revoked("some-jti").await.unwrap());
    revocations.revoke("some-jti").await.unwrap();
    revocations.revoke("some-jti").await.unwrap();
    assert!(revocations.is_revoked("some-jti").await.unwrap());

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM revoked_tokens WHERE jti = ?")
        .bind("some-jti")
        .fetch_one(&state.services.repository.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_password_reset_retires_token_and_old_password() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let token = sessions.login(EMAIL, PASSWORD).await.unwrap().token().to_string();
    let caller = sessions.authenticate(&token).await.unwrap();

    sessions.reset_password(&caller, EMAIL, "Changed456").await.unwrap();

    assert!(matches!(
        sessions.authenticate(&token).await,
        Err(AppError::Authentication(_))
    ));
    assert!(matches!(
        sessions.login(EMAIL, PASSWORD).await,
        Err(AppError::Authentication(_))
    ));

    let outcome = sessions.login(EMAIL, "Changed456").await.unwrap();
    assert!(matches!(outcome, LoginOutcome::Created { .. }));
}

#[tokio::test]
async fn test_weak_password_reset_changes_nothing() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let token = sessions.login(EMAIL, PASSWORD).await.unwrap().token().to_string();
    let caller = sessions.authenticate(&token).await.unwrap();

    let result = sessions.reset_password(&caller, EMAIL, "short").await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(sessions.authenticate(&token).await.is_ok());
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let state = test_state().await;
    add_reader(&state, "brian").await;
    let sessions = &state.services.sessions;

    let unknown = sessions.login("nobody@hellobooks.dev", PASSWORD).await;
    let wrong = sessions.login(EMAIL, "Wrong1234").await;

    match (unknown, wrong) {
        (Err(AppError::Authentication(a)), Err(AppError::Authentication(b))) => assert_eq!(a, b),
        other => panic!("unexpected results: {:?}", other),
    }
}
