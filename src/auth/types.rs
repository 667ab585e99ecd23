use serde::{Deserialize, Serialize};

/// JWT claim set. `exp` is only present when token expiry is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Login payload, same shape as a user without its id
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Greeting returned by the protected route
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProtectedResponse {
    pub msg: String,
}

impl ProtectedResponse {
    pub fn greeting(subject: &str) -> Self {
        Self {
            msg: format!("Hello {}! This is a protected route.", subject),
        }
    }
}
