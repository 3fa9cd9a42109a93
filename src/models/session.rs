//! Session models: active tokens, revoked tokens and JWT claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single live session of a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActiveToken {
    pub id: i64,
    pub user_email: String,
    pub access_token: String,
    pub jti: String,
    pub time_created: DateTime<Utc>,
}

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account email
    pub sub: String,
    /// Unique token identifier, the revocation handle
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl TokenClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token (signature and expiry are checked)
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// Identity resolved from a valid, unrevoked bearer token
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
    pub jti: String,
}

impl Caller {
    /// Require administrator privileges
    pub fn require_admin(&self) -> Result<(), crate::error::AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(crate::error::AppError::Authorization(
                "You are not authorized to access this URL.".to_string(),
            ))
        }
    }
}
