use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use userbase::{
    auth::TokenConfig,
    db,
    user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository},
    AppConfig, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "userbase=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting user service");

    let user_repository: Arc<dyn UserRepository + Send + Sync> = match &config.database.url {
        Some(url) => {
            let pool = db::connect_and_migrate(url, &config.database)
                .await
                .context("failed to prepare database")?;
            Arc::new(PostgresUserRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, users are kept in memory only");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    if config.token.expiration_minutes.is_none() {
        warn!("TOKEN_EXPIRATION_MINUTES not set, issued tokens never expire");
    }
    if config.cors == userbase::CorsConfig::AllowAll {
        warn!("CORS allows every origin with credentials, set CORS_ALLOWED_ORIGINS outside development");
    }

    let app_state = AppState::new(user_repository, TokenConfig::new(&config.token));
    let app = userbase::app(app_state, &config.cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
