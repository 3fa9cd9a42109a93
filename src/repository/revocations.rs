//! Revoked tokens repository (revocation list)

use chrono::Utc;
use sqlx::{Executor, Pool, Sqlite};

use crate::error::AppResult;

#[derive(Clone)]
pub struct RevocationsRepository {
    pool: Pool<Sqlite>,
}

impl RevocationsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Blacklist a token identifier; revoking twice is a no-op
    pub async fn revoke(&self, jti: &str) -> AppResult<()> {
        Self::insert(&self.pool, jti).await
    }

    /// Blacklist a token identifier through `executor` (e.g. an open transaction)
    pub async fn insert<'e, E>(executor: E, jti: &str) -> AppResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, time_revoked) VALUES (?, ?) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(Utc::now())
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Whether a token identifier has been blacklisted
    pub async fn is_revoked(&self, jti: &str) -> AppResult<bool> {
        let revoked: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ?)")
            .bind(jti)
            .fetch_one(&self.pool)
            .await?;
        Ok(revoked)
    }
}
