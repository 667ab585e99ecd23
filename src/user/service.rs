use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    repository::UserRepository,
    types::{UserCreateRequest, UserResponse, UserUpdateRequest},
};
use crate::shared::AppError;

/// Service for handling user CRUD logic
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Stores a new user; the store assigns the id
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create_user(&self, request: UserCreateRequest) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .create_user(&request.username, &request.password)
            .await?;

        info!(user_id = user.id, "User created");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.repository.list_users().await?;
        debug!(user_count = users.len(), "Users listed");

        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i32) -> Result<UserResponse, AppError> {
        self.repository
            .get_user(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Applies a partial update. An empty payload rewrites the row unchanged.
    #[instrument(skip(self, changes))]
    pub async fn update_user(
        &self,
        user_id: i32,
        changes: UserUpdateRequest,
    ) -> Result<UserResponse, AppError> {
        let user = self
            .repository
            .update_user(
                user_id,
                changes.username.as_deref(),
                changes.password.as_deref(),
            )
            .await?;

        info!(user_id, "User updated");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        self.repository.delete_user(user_id).await?;

        info!(user_id, "User deleted");
        Ok(())
    }
}
