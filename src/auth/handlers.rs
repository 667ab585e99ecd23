use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{Claims, LoginRequest, ProtectedResponse, TokenResponse},
};
use crate::shared::{AppError, AppState, JsonBody};

/// HTTP handler for logging in
///
/// POST /token
/// Returns a signed bearer token for valid credentials, 400 otherwise
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    info!(username = %request.username, "Login attempt");

    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );
    let token = service.login(request).await?;

    Ok(Json(token))
}

/// GET /protected, behind `jwt_auth`
#[instrument(name = "protected", skip(claims), fields(sub = %claims.sub))]
pub async fn protected(Extension(claims): Extension<Claims>) -> Json<ProtectedResponse> {
    Json(ProtectedResponse::greeting(&claims.sub))
}
