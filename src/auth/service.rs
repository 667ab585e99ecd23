use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    token::TokenConfig,
    types::{Claims, LoginRequest, TokenResponse},
};
use crate::{shared::AppError, user::repository::UserRepository};

/// Service for credential checks and token issuing
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Checks the credentials against the first user with that username and
    /// issues a bearer token for it
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, AppError> {
        let user = self.repository.find_by_username(&request.username).await?;

        match user {
            Some(user) if user.password_matches(&request.password) => {
                let token = self.token_config.create_token(&request.username)?;
                info!(user_id = user.id, "Login successful");
                Ok(TokenResponse::bearer(token))
            }
            Some(_) => {
                warn!("Login rejected: password mismatch");
                Err(AppError::InvalidCredentials)
            }
            None => {
                warn!("Login rejected: unknown username");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    /// Verifies a bearer token and returns its claims
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.token_config.validate_token(token)
    }
}
