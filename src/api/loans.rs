//! Lending endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{HistoryQuery, LoanDetails},
};

use super::AuthenticatedUser;

/// Borrow or return outcome
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    pub message: String,
    pub loan: LoanDetails,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/users/books/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Book borrowed", body = LoanResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book does not exist"),
        (status = 409, description = "Book not available")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state.services.lending.borrow_book(id, &caller).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            message: "You have successfully borrowed this book.".to_string(),
            loan: loan.into(),
        }),
    ))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/users/books/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book returned", body = LoanResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book does not exist"),
        (status = 409, description = "Book is not borrowed")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_caller): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.lending.return_book(id).await?;

    Ok(Json(LoanResponse {
        message: "You have successfully returned this book.".to_string(),
        loan: loan.into(),
    }))
}

/// Borrowing history of the caller
#[utoipa::path(
    get,
    path = "/users/books",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(HistoryQuery),
    responses(
        (status = 200, description = "Caller's loans, most recent first", body = Vec<LoanDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn user_borrowing_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state
        .services
        .lending
        .user_loan_history(&caller, query.open_only())
        .await?;

    Ok(Json(loans.into_iter().map(LoanDetails::from).collect()))
}

/// All loans not yet returned (administrators only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open loans", body = Vec<LoanDetails>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_open_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    caller.require_admin()?;

    let loans = state.services.lending.open_loans().await?;
    Ok(Json(loans.into_iter().map(LoanDetails::from).collect()))
}
