//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

pub const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a book still in the catalog
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;
        if book.deleted {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(book)
    }

    /// List active books; a page past the end of a non-empty catalog is an error
    pub async fn list_books(&self, page: Option<i64>, per_page: Option<i64>) -> AppResult<(Vec<Book>, i64)> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page < 1 || !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::Validation(format!(
                "page must be at least 1 and per_page between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        let (books, total) = self.repository.books.list_active(page, per_page).await?;
        if books.is_empty() && page > 1 {
            return Err(AppError::NotFound("The requested page was not found".to_string()));
        }
        Ok((books, total))
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.check_fields()?;
        let created = self.repository.books.create(&book).await?;
        tracing::info!("Book {} added to the catalog", created.id);
        Ok(created)
    }

    /// Edit the descriptive fields of a book
    pub async fn update_book(&self, id: i64, book: UpdateBook) -> AppResult<Book> {
        book.check_fields()?;
        self.repository.books.update(id, &book).await
    }

    /// Remove a book from the catalog; open loans on it stay returnable
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.soft_delete(id).await?;
        tracing::info!("Book {} removed from the catalog", id);
        Ok(())
    }
}
