//! User registration and administrator bootstrap

use std::sync::Arc;

use validator::Validate;

use crate::{
    config::AdminConfig,
    error::{AppError, AppResult},
    models::user::{check_password_strength, CreateUser, User},
    repository::Repository,
    services::password::CredentialVerifier,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    verifier: Arc<dyn CredentialVerifier>,
}

impl UsersService {
    pub fn new(repository: Repository, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { repository, verifier }
    }

    /// Register a regular (non-administrator) account
    pub async fn register(&self, user: CreateUser) -> AppResult<User> {
        let user = CreateUser {
            username: user.username.trim().to_string(),
            email: user.email.trim().to_string(),
            password: user.password,
        };
        if user.username.is_empty() {
            return Err(AppError::Validation("Username Not Provided".to_string()));
        }
        if user.email.is_empty() {
            return Err(AppError::Validation("Email Not Provided".to_string()));
        }
        user.validate()?;
        check_password_strength(&user.password)?;

        if self.repository.users.username_exists(&user.username).await? {
            return Err(AppError::Conflict("This Username is already taken.".to_string()));
        }
        if self.repository.users.get_by_email(&user.email).await?.is_some() {
            return Err(AppError::Conflict("This Email already exists.".to_string()));
        }

        let digest = self.verifier.hash(&user.password)?;
        let created = self
            .repository
            .users
            .create(&user.username, &user.email, &digest, false)
            .await?;

        tracing::info!("Registered user {} ({})", created.id, created.username);
        Ok(created)
    }

    /// Create the configured administrator if no account uses its email yet
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<()> {
        if self.repository.users.get_by_email(&admin.email).await?.is_some() {
            return Ok(());
        }

        let digest = self.verifier.hash(&admin.password)?;
        let created = self
            .repository
            .users
            .create(&admin.username, &admin.email, &digest, true)
            .await?;

        tracing::info!("Created administrator account {}", created.id);
        Ok(())
    }
}
