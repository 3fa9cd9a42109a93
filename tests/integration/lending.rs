//! Borrow and return against the loan ledger

use chrono::Duration;
use hello_books_server::{
    models::{CreateBook, UpdateBook},
    AppError,
};

use crate::common::{add_book, add_reader, caller_for, open_loan_rows, test_state};

#[tokio::test]
async fn test_borrow_then_return_restores_availability() {
    let state = test_state().await;
    let book = state
        .services
        .catalog
        .create_book(CreateBook {
            title: "Kamusi ya Methali".to_string(),
            author: "Brian Mecha".to_string(),
            description: "Swahili proverbs".to_string(),
        })
        .await
        .unwrap();
    let reader = add_reader(&state, "brian").await;
    let caller = caller_for(&reader);

    let loan = state.services.lending.borrow_book(book.id, &caller).await.unwrap();
    assert_eq!(loan.book_id, book.id);
    assert_eq!(loan.user_id, reader.id);
    assert_eq!(loan.book_title, "Kamusi ya Methali");
    assert_eq!(loan.book_author, "Brian Mecha");
    assert!(!loan.returned);
    assert_eq!(loan.due_date - loan.date_borrowed, Duration::days(6));

    let stored = state.services.repository.books.get_by_id(book.id).await.unwrap();
    assert!(!stored.availability);

    let returned = state.services.lending.return_book(book.id).await.unwrap();
    assert_eq!(returned.id, loan.id);
    assert!(returned.returned);
    assert!(returned.returned_date.is_some());

    let stored = state.services.repository.books.get_by_id(book.id).await.unwrap();
    assert!(stored.availability);
    assert_eq!(open_loan_rows(&state).await, 0);

    let history = state.services.lending.user_loan_history(&caller, false).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].book_id, book.id);
    assert!(history[0].returned);
}

#[tokio::test]
async fn test_second_borrow_is_refused_without_new_loan() {
    let state = test_state().await;
    let book = add_book(&state, "Things Fall Apart").await;
    let first = caller_for(&add_reader(&state, "brian").await);
    let second = caller_for(&add_reader(&state, "amina").await);

    state.services.lending.borrow_book(book.id, &first).await.unwrap();

    let result = state.services.lending.borrow_book(book.id, &second).await;
    assert!(matches!(result, Err(AppError::NotAvailable(_))));

    let result = state.services.lending.borrow_book(book.id, &first).await;
    assert!(matches!(result, Err(AppError::NotAvailable(_))));

    assert_eq!(open_loan_rows(&state).await, 1);
    let history = state.services.lending.user_loan_history(&second, false).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_returning_an_available_book_fails() {
    let state = test_state().await;
    let book = add_book(&state, "The River Between").await;

    let result = state.services.lending.return_book(book.id).await;
    assert!(matches!(result, Err(AppError::NotBorrowed(_))));

    let result = state.services.lending.return_book(9999).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_missing_or_deleted_book_cannot_be_borrowed() {
    let state = test_state().await;
    let caller = caller_for(&add_reader(&state, "brian").await);

    let result = state.services.lending.borrow_book(9999, &caller).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let book = add_book(&state, "Petals of Blood").await;
    state.services.catalog.delete_book(book.id).await.unwrap();

    let result = state.services.lending.borrow_book(book.id, &caller).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_deleted_book_on_loan_can_still_be_returned() {
    let state = test_state().await;
    let book = add_book(&state, "Weep Not, Child").await;
    let caller = caller_for(&add_reader(&state, "brian").await);

    state.services.lending.borrow_book(book.id, &caller).await.unwrap();
    state.services.catalog.delete_book(book.id).await.unwrap();

    assert!(matches!(
        state.services.catalog.get_book(book.id).await,
        Err(AppError::NotFound(_))
    ));

    let returned = state.services.lending.return_book(book.id).await.unwrap();
    assert!(returned.returned);
}

#[tokio::test]
async fn test_loan_keeps_book_details_from_borrow_time() {
    let state = test_state().await;
    let book = add_book(&state, "Old Title").await;
    let caller = caller_for(&add_reader(&state, "brian").await);

    let loan = state.services.lending.borrow_book(book.id, &caller).await.unwrap();

    state
        .services
        .catalog
        .update_book(
            book.id,
            UpdateBook {
                title: Some("New Title".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let history = state.services.lending.user_loan_history(&caller, false).await.unwrap();
    assert_eq!(history[0].id, loan.id);
    assert_eq!(history[0].book_title, "Old Title");
}

#[tokio::test]
async fn test_concurrent_borrows_open_exactly_one_loan() {
    let state = test_state().await;
    let book = add_book(&state, "Nervous Conditions").await;
    let first = caller_for(&add_reader(&state, "brian").await);
    let second = caller_for(&add_reader(&state, "amina").await);

    let (a, b) = tokio::join!(
        state.services.lending.borrow_book(book.id, &first),
        state.services.lending.borrow_book(book.id, &second),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let failure = if a.is_ok() { b } else { a };
    assert!(matches!(failure, Err(AppError::NotAvailable(_))));
    assert_eq!(open_loan_rows(&state).await, 1);
}

#[tokio::test]
async fn test_store_rejects_a_second_open_loan() {
    let state = test_state().await;
    let book = add_book(&state, "Half of a Yellow Sun").await;
    let reader = add_reader(&state, "brian").await;

    state
        .services
        .lending
        .borrow_book(book.id, &caller_for(&reader))
        .await
        .unwrap();

    let result = sqlx::query(
        r#"
        INSERT INTO borrowing_history (
            book_id, user_id, book_title, book_author, book_description,
            date_borrowed, due_date, returned
        )
        VALUES (?, ?, 'x', 'x', 'x', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP, 0)
        "#,
    )
    .bind(book.id)
    .bind(reader.id)
    .execute(&state.services.repository.pool)
    .await;

    match result {
        Err(sqlx::Error::Database(e)) => assert!(e.is_unique_violation()),
        other => panic!("unexpected result: {:?}", other.map(|r| r.rows_affected())),
    }
}

#[tokio::test]
async fn test_history_lists_recent_first_and_filters_open_loans() {
    let state = test_state().await;
    let first = add_book(&state, "Arrow of God").await;
    let second = add_book(&state, "A Grain of Wheat").await;
    let caller = caller_for(&add_reader(&state, "brian").await);

    state.services.lending.borrow_book(first.id, &caller).await.unwrap();
    state.services.lending.return_book(first.id).await.unwrap();
    state.services.lending.borrow_book(second.id, &caller).await.unwrap();

    let history = state.services.lending.user_loan_history(&caller, false).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].book_id, second.id);
    assert_eq!(history[1].book_id, first.id);

    let open = state.services.lending.user_loan_history(&caller, true).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].book_id, second.id);

    let all_open = state.services.lending.open_loans().await.unwrap();
    assert_eq!(all_open.len(), 1);
}
