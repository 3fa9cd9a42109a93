//! Session lifecycle: login, logout, password reset and the request gate

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{
        session::{ActiveToken, Caller},
        user::check_password_strength,
    },
    repository::{revocations::RevocationsRepository, sessions::SessionsRepository, users::UsersRepository, Repository},
    services::{password::CredentialVerifier, tokens::TokenCodec},
};

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A new session was registered for this token
    Created { token: String, is_admin: bool },
    /// The user already had a live session; its token stays authoritative
    AlreadyActive { token: String, is_admin: bool },
}

impl LoginOutcome {
    pub fn token(&self) -> &str {
        match self {
            LoginOutcome::Created { token, .. } | LoginOutcome::AlreadyActive { token, .. } => token,
        }
    }

    pub fn is_admin(&self) -> bool {
        match self {
            LoginOutcome::Created { is_admin, .. } | LoginOutcome::AlreadyActive { is_admin, .. } => {
                *is_admin
            }
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    repository: Repository,
    tokens: TokenCodec,
    verifier: Arc<dyn CredentialVerifier>,
}

impl SessionService {
    pub fn new(repository: Repository, tokens: TokenCodec, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            repository,
            tokens,
            verifier,
        }
    }

    /// Check credentials and register a session
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::Validation("Email is missing.".to_string()));
        }
        if password.trim().is_empty() {
            return Err(AppError::Validation("Password is missing.".to_string()));
        }

        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Wrong Email or Password".to_string()))?;

        if !self.verifier.verify(password, &user.password)? {
            return Err(AppError::Authentication("Wrong Email or Password".to_string()));
        }

        let issued = self.tokens.issue(&user.email)?;
        let is_admin = user.is_admin;

        // A concurrent logout can remove the row between `open` and `find`; one retry settles it
        for _ in 0..2 {
            match self.repository.sessions.open(&user.email, &issued.token, &issued.jti).await {
                Ok(()) => {
                    tracing::info!("User {} logged in", user.id);
                    return Ok(LoginOutcome::Created {
                        token: issued.token,
                        is_admin,
                    });
                }
                Err(AppError::AlreadyActive(_)) => {}
                Err(e) => return Err(e),
            }

            let existing = match self.repository.sessions.find(&user.email).await {
                Ok(existing) => existing,
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };

            if self.is_live(&existing).await? {
                tracing::debug!("User {} is already logged in", user.id);
                return Ok(LoginOutcome::AlreadyActive {
                    token: existing.access_token,
                    is_admin,
                });
            }

            if self
                .repository
                .sessions
                .replace(&user.email, &existing.jti, &issued.token, &issued.jti)
                .await?
            {
                tracing::info!("User {} logged in, replacing a dead session", user.id);
                return Ok(LoginOutcome::Created {
                    token: issued.token,
                    is_admin,
                });
            }
        }

        Err(AppError::AlreadyActive("User is already logged in.".to_string()))
    }

    /// Revoke the caller's token and close their session
    pub async fn logout(&self, caller: &Caller, claimed_email: &str) -> AppResult<()> {
        if !caller.email.eq_ignore_ascii_case(claimed_email.trim()) {
            return Err(AppError::Authentication(format!(
                "User with email: {} is not logged in or token has been blacklisted",
                claimed_email
            )));
        }

        if self.repository.revocations.is_revoked(&caller.jti).await? {
            return Err(AppError::Authentication(format!(
                "User with email: {} is not logged in or token has been blacklisted",
                claimed_email
            )));
        }

        // The revocation commits on its own and stands even if closing the session fails
        self.repository.revocations.revoke(&caller.jti).await?;

        if let Err(e) = self.repository.sessions.close(&caller.email).await {
            tracing::warn!("Token of user {} revoked but session not closed: {}", caller.user_id, e);
            return Err(e);
        }

        tracing::info!("User {} logged out", caller.user_id);
        Ok(())
    }

    /// Change the caller's password and retire their current token
    pub async fn reset_password(&self, caller: &Caller, email: &str, new_password: &str) -> AppResult<()> {
        if email.trim().is_empty() {
            return Err(AppError::Validation("Email is missing.".to_string()));
        }
        if !caller.email.eq_ignore_ascii_case(email.trim()) {
            return Err(AppError::Authentication(
                "Wrong email. Please use the email you logged in with.".to_string(),
            ));
        }
        check_password_strength(new_password)?;

        let user = self.repository.users.get_by_id(caller.user_id).await?;
        if self.verifier.verify(new_password, &user.password)? {
            return Err(AppError::Validation("No changes detected in the password".to_string()));
        }
        let digest = self.verifier.hash(new_password)?;

        let mut tx = self.repository.pool.begin().await?;
        UsersRepository::set_password(&mut *tx, user.id, &digest).await?;
        RevocationsRepository::insert(&mut *tx, &caller.jti).await?;
        let closed = SessionsRepository::remove(&mut *tx, &caller.email).await?;
        tx.commit().await?;

        if !closed {
            tracing::warn!("Password of user {} reset without a registered session", user.id);
        }
        tracing::info!("Password reset for user {}", user.id);
        Ok(())
    }

    /// Resolve a bearer token to its caller.
    ///
    /// Rejects malformed, badly signed, expired and revoked tokens.
    pub async fn authenticate(&self, token: &str) -> AppResult<Caller> {
        let claims = self.tokens.decode(token)?;

        if self.repository.revocations.is_revoked(&claims.jti).await? {
            return Err(AppError::Authentication(
                "Your session has expired. Login again to continue.".to_string(),
            ));
        }

        let user = self
            .repository
            .users
            .get_by_email(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Authentication("Unknown account".to_string()))?;

        Ok(Caller {
            user_id: user.id,
            email: user.email,
            is_admin: user.is_admin,
            jti: claims.jti,
        })
    }

    /// A stored session is live while its token decodes and is not revoked
    async fn is_live(&self, session: &ActiveToken) -> AppResult<bool> {
        if self.tokens.decode(&session.access_token).is_err() {
            return Ok(false);
        }
        Ok(!self.repository.revocations.is_revoked(&session.jti).await?)
    }
}
