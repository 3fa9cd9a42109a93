//! Books repository (catalog store)

use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

use super::is_unique_violation;

const DUPLICATE_TITLE: &str = "Book with that title already exists.";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID, soft-deleted books included
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books still in the catalog, one page at a time
    pub async fn list_active(&self, page: i64, per_page: i64) -> AppResult<(Vec<Book>, i64)> {
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| AppError::NotFound("The requested page was not found".to_string()))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE deleted = 0 ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Create a new book, available for borrowing
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, description, availability, deleted, created_at, updated_at)
            VALUES (?, ?, ?, 1, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(book.title.trim())
        .bind(book.author.trim())
        .bind(book.description.trim())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateTitle(DUPLICATE_TITLE.to_string())
            } else {
                e.into()
            }
        })
    }

    /// Update the descriptive fields of an active book
    pub async fn update(&self, id: i64, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE(?, title),
                author = COALESCE(?, author),
                description = COALESCE(?, description),
                updated_at = ?
            WHERE id = ? AND deleted = 0
            RETURNING *
            "#,
        )
        .bind(book.title.as_deref().map(str::trim))
        .bind(book.author.as_deref().map(str::trim))
        .bind(book.description.as_deref().map(str::trim))
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateTitle(DUPLICATE_TITLE.to_string())
            } else {
                AppError::from(e)
            }
        })?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Mark a book deleted; its loan history is kept
    pub async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE books SET deleted = 1, updated_at = ? WHERE id = ? AND deleted = 0")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
