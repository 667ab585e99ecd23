use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument, warn};

use super::types::Claims;
use crate::config::TokenSettings;
use crate::shared::AppError;

/// Signing and verification of bearer tokens with a single shared secret
#[derive(Clone)]
pub struct TokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    pub expiration_minutes: Option<i64>,
}

impl TokenConfig {
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(settings.algorithm);
        if settings.expiration_minutes.is_none() {
            // Tokens may omit `exp`; one that is present is still checked
            validation.required_spec_claims.clear();
        }

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            algorithm: settings.algorithm,
            validation,
            expiration_minutes: settings.expiration_minutes,
        }
    }

    /// Creates a signed token whose `sub` is the given username
    #[instrument(skip(self))]
    pub fn create_token(&self, username: &str) -> Result<String, AppError> {
        let exp = match self.expiration_minutes {
            Some(minutes) => {
                let expires_at = Duration::try_minutes(minutes)
                    .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        warn!(minutes, "Token lifetime out of range");
                        AppError::Internal
                    })?;
                Some(expires_at.timestamp().max(0) as u64)
            }
            None => None,
        };

        debug!(?exp, "Creating JWT token");

        let claims = Claims {
            sub: username.to_string(),
            exp,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            warn!(error = %e, "Failed to encode JWT token");
            AppError::Internal
        })
    }

    /// Validates a token's signature (and `exp`, whenever present) and returns its claims
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| {
                debug!(sub = %data.claims.sub, "JWT token decoded successfully");
                data.claims
            })
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                AppError::JwtError(e.to_string())
            })
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new(&TokenSettings::default())
    }
}
