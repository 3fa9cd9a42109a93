//! Business logic services

pub mod catalog;
pub mod lending;
pub mod password;
pub mod sessions;
pub mod tokens;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub sessions: sessions::SessionService,
    pub users: users::UsersService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with Argon2 password hashing
    pub fn new(repository: Repository, auth_config: &AuthConfig) -> Self {
        Self::with_verifier(repository, auth_config, Arc::new(password::Argon2Verifier))
    }

    /// Create all services with a specific credential verifier
    pub fn with_verifier(
        repository: Repository,
        auth_config: &AuthConfig,
        verifier: Arc<dyn password::CredentialVerifier>,
    ) -> Self {
        let tokens = tokens::TokenCodec::new(auth_config);
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone()),
            sessions: sessions::SessionService::new(repository.clone(), tokens, verifier.clone()),
            users: users::UsersService::new(repository.clone(), verifier),
            repository,
        }
    }
}
