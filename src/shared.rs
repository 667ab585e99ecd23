use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::PathRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::TokenConfig;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub token_config: TokenConfig,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            user_repository,
            token_config,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be extracted (bad JSON, wrong shape, bad path segment)
    #[error("Rejected request ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

/// JSON request body that is parsed whatever the `Content-Type` says.
/// Malformed JSON and a wrong shape are both rejected with 422.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Rejected {
                status: rejection.status(),
                detail: rejection.body_text(),
            })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError::Rejected {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: format!("Invalid request body: {}", e),
            })
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Rejected {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Rejected { status, detail } => (status, detail),
            AppError::JwtError(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Invalid username or password".to_string(),
            ),
            AppError::DatabaseError(msg) => {
                // Store details stay in the logs
                error!(error = %msg, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "detail": detail
        }));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::config::TokenSettings;
    use crate::user::models::UserModel;
    use crate::user::repository::InMemoryUserRepository;
    use async_trait::async_trait;

    /// Repository whose every call fails, for exercising the 500 path
    pub struct FailingUserRepository;

    #[async_trait]
    impl UserRepository for FailingUserRepository {
        async fn create_user(&self, _username: &str, _password: &str) -> Result<UserModel, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn list_users(&self) -> Result<Vec<UserModel>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn get_user(&self, _user_id: i32) -> Result<Option<UserModel>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn find_by_username(&self, _username: &str) -> Result<Option<UserModel>, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn update_user(
            &self,
            _user_id: i32,
            _username: Option<&str>,
            _password: Option<&str>,
        ) -> Result<UserModel, AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
        async fn delete_user(&self, _user_id: i32) -> Result<(), AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
    }

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        user_repository: Option<Arc<dyn UserRepository + Send + Sync>>,
        token_settings: TokenSettings,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                user_repository: None,
                token_settings: TokenSettings::default(),
            }
        }

        pub fn with_user_repository(mut self, repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
            self.user_repository = Some(repo);
            self
        }

        pub fn with_token_settings(mut self, settings: TokenSettings) -> Self {
            self.token_settings = settings;
            self
        }

        pub fn build(self) -> AppState {
            AppState {
                user_repository: self
                    .user_repository
                    .unwrap_or_else(|| Arc::new(InMemoryUserRepository::new())),
                token_config: TokenConfig::new(&self.token_settings),
            }
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
