//! User model and related types

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

static PASSWORD_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9#`~^@$?!%&,./']{8,}$").expect("valid password regex"));
static HAS_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").expect("valid regex"));
static HAS_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").expect("valid regex"));
static HAS_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").expect("valid regex"));

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 32, message = "Username must be between 3 and 32 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid Email!"))]
    pub email: String,
    pub password: String,
}

/// Reject passwords that do not meet the account password policy
pub fn check_password_strength(password: &str) -> AppResult<()> {
    if password.trim().is_empty() {
        return Err(AppError::Validation("Password is missing.".to_string()));
    }
    if password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password should be at least 8 characters long.".to_string(),
        ));
    }
    if !PASSWORD_CHARSET.is_match(password)
        || !HAS_LOWER.is_match(password)
        || !HAS_UPPER.is_match(password)
        || !HAS_DIGIT.is_match(password)
    {
        return Err(AppError::Validation(
            "Password should contain at least an uppercase character, lower case character and a number"
                .to_string(),
        ));
    }
    Ok(())
}
