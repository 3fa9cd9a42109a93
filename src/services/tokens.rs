//! Bearer token issuance and verification

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::session::TokenClaims,
};

/// A freshly signed token and its identifier
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
}

/// Signs and checks HS256 JWTs
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    expiration_hours: u64,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration_hours: config.jwt_expiration_hours,
        }
    }

    /// Issue a token for `identity` with a fresh unique identifier
    pub fn issue(&self, identity: &str) -> AppResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            sub: identity.to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: now + (self.expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken {
            token,
            jti: claims.jti,
        })
    }

    /// Decode a token, rejecting bad signatures and expired tokens
    pub fn decode(&self, token: &str) -> AppResult<TokenClaims> {
        TokenClaims::from_token(token, &self.secret)
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }
}
