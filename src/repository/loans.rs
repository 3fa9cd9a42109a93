//! Loans repository (loan ledger)
//!
//! Owns the borrowing history and is the only writer of `books.availability`.
//! Every transition begins with the conditional write on the book row so that
//! the transaction holds the write lock before anything is read, and the
//! `idx_borrowing_history_open_loan` unique index backs the one-open-loan rule.

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{due_date_for, Loan},
    },
};

use super::is_unique_violation;

const NOT_AVAILABLE: &str = "This Book is not available for borrowing.";
const NOT_BORROWED: &str = "This book is not borrowed.";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open a loan on an available book
    pub async fn borrow(&self, book_id: i64, user_id: i64) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            UPDATE books SET availability = 0, updated_at = ?
            WHERE id = ? AND availability = 1 AND deleted = 0
            "#,
        )
        .bind(Utc::now())
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?;

        let book = match book {
            Some(book) if !book.deleted => book,
            _ => return Err(AppError::NotFound("Book does not exist".to_string())),
        };

        if claimed == 0 {
            return Err(AppError::NotAvailable(NOT_AVAILABLE.to_string()));
        }

        let date_borrowed = Utc::now();

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO borrowing_history (
                book_id, user_id, book_title, book_author, book_description,
                date_borrowed, due_date, returned
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(date_borrowed)
        .bind(due_date_for(date_borrowed))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::NotAvailable(NOT_AVAILABLE.to_string())
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Close the open loan on a book and make it available again.
    ///
    /// Soft-deleted books stay returnable.
    pub async fn return_book(&self, book_id: i64) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let released = sqlx::query(
            "UPDATE books SET availability = 1, updated_at = ? WHERE id = ? AND availability = 0",
        )
        .bind(Utc::now())
        .bind(book_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if released == 0 {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;

            return Err(if exists {
                AppError::NotBorrowed(NOT_BORROWED.to_string())
            } else {
                AppError::NotFound("Book does not exist.".to_string())
            });
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE borrowing_history SET returned = 1, returned_date = ?
            WHERE book_id = ? AND returned = 0
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Book {} is marked on loan but has no open loan", book_id))
        })?;

        tx.commit().await?;

        Ok(loan)
    }

    /// All loans not yet returned
    pub async fn open_loans(&self) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM borrowing_history WHERE returned = 0 ORDER BY due_date, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Loans of a user, most recent first
    pub async fn history_for(&self, user_id: i64, open_only: bool) -> AppResult<Vec<Loan>> {
        let query = if open_only {
            r#"
            SELECT * FROM borrowing_history
            WHERE user_id = ? AND returned = 0
            ORDER BY date_borrowed DESC, id DESC
            "#
        } else {
            r#"
            SELECT * FROM borrowing_history
            WHERE user_id = ?
            ORDER BY date_borrowed DESC, id DESC
            "#
        };

        let loans = sqlx::query_as::<_, Loan>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(loans)
    }
}
