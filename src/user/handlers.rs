use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{UserCreateRequest, UserResponse, UserUpdateRequest},
};
use crate::shared::{AppError, AppState, JsonBody};

/// HTTP handler for creating a user
///
/// POST /users/
/// Returns the stored user including its assigned id
#[instrument(name = "create_user", skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UserCreateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    info!(username = %request.username, "Creating new user");

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.create_user(request).await?;

    Ok(Json(user))
}

/// HTTP handler for listing all users
///
/// GET /users/
#[instrument(name = "list_users", skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let service = UserService::new(Arc::clone(&state.user_repository));
    let users = service.list_users().await?;

    info!(user_count = users.len(), "Users listed successfully");

    Ok(Json(users))
}

/// GET /users/{id}
#[instrument(name = "get_user", skip(state, user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Path(user_id) = user_id?;

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.get_user(user_id).await?;

    Ok(Json(user))
}

/// PUT /users/{id}
///
/// Partial update: fields missing from the body keep their stored values
#[instrument(name = "update_user", skip(state, user_id, changes))]
pub async fn update_user(
    State(state): State<AppState>,
    user_id: Result<Path<i32>, PathRejection>,
    JsonBody(changes): JsonBody<UserUpdateRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let Path(user_id) = user_id?;
    info!(
        user_id,
        username_changed = changes.username.is_some(),
        password_changed = changes.password.is_some(),
        "Updating user"
    );

    let service = UserService::new(Arc::clone(&state.user_repository));
    let user = service.update_user(user_id, changes).await?;

    Ok(Json(user))
}

/// DELETE /users/{id}
///
/// Responds 204 with an empty body
#[instrument(name = "delete_user", skip(state, user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    user_id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(user_id) = user_id?;

    let service = UserService::new(Arc::clone(&state.user_repository));
    service.delete_user(user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
