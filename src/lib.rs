// Library crate for the user service
// Exposes the router and building blocks for main.rs and integration tests

pub mod auth;
pub mod config;
pub mod db;
pub mod shared;
pub mod user;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, CorsConfig};
pub use shared::{AppError, AppState};

/// Builds the full application router
pub fn app(app_state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/users/", get(user::list_users).post(user::create_user))
        .route(
            "/users/:user_id",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route("/token", post(auth::login))
        .route(
            "/protected",
            get(auth::protected).route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                auth::jwt_auth,
            )),
        )
        .layer(cors.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({"Hello": "World"}))
}
