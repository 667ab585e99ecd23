// Public API - what other modules can use
pub use handlers::{login, protected};
pub use middleware::jwt_auth;
pub use token::TokenConfig;
pub use types::Claims;

// Internal modules
mod handlers;
mod middleware;
pub mod service;
mod token;
pub mod types;
