//! Active tokens repository (session registry)

use chrono::Utc;
use sqlx::{Executor, Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::session::ActiveToken,
};

use super::is_unique_violation;

#[derive(Clone)]
pub struct SessionsRepository {
    pool: Pool<Sqlite>,
}

impl SessionsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Register the live session of a user; never overwrites an existing one
    pub async fn open(&self, user_email: &str, access_token: &str, jti: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO active_tokens (user_email, access_token, jti, time_created) VALUES (?, ?, ?, ?)",
        )
        .bind(user_email)
        .bind(access_token)
        .bind(jti)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadyActive("User is already logged in.".to_string())
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    /// Find the live session of a user
    pub async fn find(&self, user_email: &str) -> AppResult<ActiveToken> {
        sqlx::query_as::<_, ActiveToken>("SELECT * FROM active_tokens WHERE user_email = ?")
            .bind(user_email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No active session for {}", user_email)))
    }

    /// Remove the live session of a user
    pub async fn close(&self, user_email: &str) -> AppResult<()> {
        if !Self::remove(&self.pool, user_email).await? {
            return Err(AppError::NotFound(format!("No active session for {}", user_email)));
        }
        Ok(())
    }

    /// Delete the session row through `executor`; returns whether a row existed
    pub async fn remove<'e, E>(executor: E, user_email: &str) -> AppResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM active_tokens WHERE user_email = ?")
            .bind(user_email)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Swap a dead session for a new one.
    ///
    /// Only succeeds while the stored row still carries `stale_jti`, so two
    /// concurrent logins cannot both take over the same dead session.
    pub async fn replace(
        &self,
        user_email: &str,
        stale_jti: &str,
        access_token: &str,
        jti: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE active_tokens SET access_token = ?, jti = ?, time_created = ?
            WHERE user_email = ? AND jti = ?
            "#,
        )
        .bind(access_token)
        .bind(jti)
        .bind(Utc::now())
        .bind(user_email)
        .bind(stale_jti)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
