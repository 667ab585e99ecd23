use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::service::AuthService;
use crate::shared::{AppError, AppState};

/// JWT authentication middleware - validates the Authorization Bearer header and adds Claims to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::jwt_auth))
/// Handlers can then extract Extension(claims): Extension<Claims>.
#[instrument(skip(state, req, next))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "JWT authentication middleware triggered");

    let token = bearer_token(&req)?.to_string();

    let service = AuthService::new(
        Arc::clone(&state.user_repository),
        state.token_config.clone(),
    );
    let claims = service.verify(&token).map_err(|e| {
        warn!("JWT authentication failed: {}", e);
        e
    })?;

    debug!(sub = %claims.sub, "Authentication successful, adding claims to request");

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Pulls the token out of `Authorization: Bearer <token>`; the scheme is case-insensitive
fn bearer_token(req: &Request) -> Result<&str, AppError> {
    let not_authenticated = || AppError::Unauthorized("Not authenticated".to_string());

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing Authorization header in request");
            not_authenticated()
        })?;

    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => Ok(token.trim()),
        _ => {
            warn!("Invalid Authorization header format (expected Bearer token)");
            Err(not_authenticated())
        }
    }
}
