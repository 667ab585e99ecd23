use std::sync::Arc;

use axum::Router;
use userbase::{
    auth::TokenConfig,
    config::TokenSettings,
    user::repository::{InMemoryUserRepository, UserRepository},
    AppState, CorsConfig,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryUserRepository>,
    pub token_config: TokenConfig,
}

pub struct TestAppBuilder {
    users: Vec<(String, String)>,
    token_settings: TokenSettings,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            users: vec![],
            token_settings: TokenSettings::default(),
        }
    }

    /// Seeds the store with a user before the app is built
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    pub fn with_token_expiry(mut self, minutes: i64) -> Self {
        self.token_settings.expiration_minutes = Some(minutes);
        self
    }

    pub async fn build(self) -> TestApp {
        let repository = Arc::new(InMemoryUserRepository::new());
        for (username, password) in &self.users {
            repository.create_user(username, password).await.unwrap();
        }

        let token_config = TokenConfig::new(&self.token_settings);
        let app_state = AppState::new(repository.clone(), token_config.clone());
        let router = userbase::app(app_state, &CorsConfig::AllowAll);

        TestApp {
            router,
            repository,
            token_config,
        }
    }
}
