//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    /// False while the book is on loan; only the loan ledger writes it
    pub availability: bool,
    #[serde(skip_serializing)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub description: String,
}

impl CreateBook {
    /// Every field must carry visible text
    pub fn check_fields(&self) -> AppResult<()> {
        require_text("Title", &self.title)?;
        require_text("Author", &self.author)?;
        require_text("Description", &self.description)
    }
}

/// Update book request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

impl UpdateBook {
    pub fn check_fields(&self) -> AppResult<()> {
        if self.title.is_none() && self.author.is_none() && self.description.is_none() {
            return Err(AppError::Validation("No book update information passed".to_string()));
        }
        if let Some(ref title) = self.title {
            require_text("Title", title)?;
        }
        if let Some(ref author) = self.author {
            require_text("Author", author)?;
        }
        if let Some(ref description) = self.description {
            require_text("Description", description)?;
        }
        Ok(())
    }
}

/// Book listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        let article = if field.starts_with(['A', 'E', 'I', 'O', 'U']) { "an" } else { "a" };
        return Err(AppError::Validation(format!("Book must have {} {}", article, field)));
    }
    Ok(())
}
