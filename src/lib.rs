//! Hello Books
//!
//! A library lending server: a book catalog, a borrowing ledger that keeps
//! availability consistent with open loans, and bearer-token sessions with
//! revocation, exposed as a REST JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
