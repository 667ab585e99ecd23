use std::env;

use axum::http::HeaderValue;
use jsonwebtoken::Algorithm;
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_JWT_SECRET: &str = "my-very-secret-key";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Ten years
const MAX_TOKEN_EXPIRATION_MINUTES: i64 = 10 * 365 * 24 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration, sourced from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database: DatabaseConfig,
    pub token: TokenSettings,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `None` selects the in-memory repository
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub algorithm: Algorithm,
    /// Tokens never expire when unset
    pub expiration_minutes: Option<i64>,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
            expiration_minutes: None,
        }
    }
}

/// Cross-origin policy. `AllowAll` mirrors the caller and allows credentials,
/// which is only suitable for development.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsConfig {
    AllowAll,
    Origins(Vec<HeaderValue>),
}

impl CorsConfig {
    pub fn layer(&self) -> CorsLayer {
        match self {
            CorsConfig::AllowAll => CorsLayer::very_permissive(),
            CorsConfig::Origins(origins) => CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins.clone()))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the process environment still applies
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let max_connections = match non_empty("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => parse_number("DATABASE_MAX_CONNECTIONS", &raw)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let algorithm = match non_empty("JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::HS256,
        };

        let expiration_minutes = non_empty("TOKEN_EXPIRATION_MINUTES")
            .map(|raw| parse_expiration(&raw))
            .transpose()?;

        let cors = match non_empty("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_cors(&raw)?,
            None => CorsConfig::AllowAll,
        };

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database: DatabaseConfig {
                url: non_empty("DATABASE_URL"),
                max_connections,
            },
            token: TokenSettings {
                secret: non_empty("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
                algorithm,
                expiration_minutes,
            },
            cors,
        })
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn parse_expiration(raw: &str) -> Result<i64, ConfigError> {
    let minutes: i64 = parse_number("TOKEN_EXPIRATION_MINUTES", raw)?;

    if !(1..=MAX_TOKEN_EXPIRATION_MINUTES).contains(&minutes) {
        return Err(ConfigError::InvalidValue {
            name: "TOKEN_EXPIRATION_MINUTES",
            value: raw.to_string(),
            reason: format!("must be between 1 and {}", MAX_TOKEN_EXPIRATION_MINUTES),
        });
    }
    Ok(minutes)
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        name: "JWT_ALGORITHM",
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let algorithm: Algorithm = raw
        .trim()
        .to_uppercase()
        .parse()
        .map_err(|_| invalid("unknown algorithm"))?;

    // Only shared-secret algorithms make sense with a single secret string
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(invalid("only HS256, HS384 and HS512 are supported")),
    }
}

fn parse_cors(raw: &str) -> Result<CorsConfig, ConfigError> {
    if raw.trim() == "*" {
        return Ok(CorsConfig::AllowAll);
    }

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                name: "CORS_ALLOWED_ORIGINS",
                value: origin.to_string(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsConfig::Origins(origins))
}
