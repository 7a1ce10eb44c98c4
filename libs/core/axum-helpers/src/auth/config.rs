//! Configuration types for axum-helpers.
//!
//! This module provides configuration structs that implement the `FromEnv` trait
//! from `core_config`.

use core_config::{ConfigError, Environment, FromEnv, env_or_default, env_required};

/// Signing secret used when `JWT_SECRET` is unset in development.
const DEVELOPMENT_SECRET: &str = "development-only-secret-change-me-0123456789";

/// Default lifetime of an issued token, in seconds.
pub const DEFAULT_TOKEN_TTL: i64 = 3600;

/// JWT authentication configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required in production) - at least 32 characters
/// - `JWT_TTL_SECONDS` (optional, default 3600)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// JWT signing secret (minimum 32 characters)
    pub secret: String,
    /// Token lifetime in seconds
    pub ttl_seconds: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig with the given secret and the default lifetime.
    ///
    /// # Panics
    /// Panics if the secret is less than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= 32,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            ttl_seconds: DEFAULT_TOKEN_TTL,
        }
    }

    /// Loads from the environment, falling back to a fixed secret in development.
    pub fn from_env_for(environment: &Environment) -> Result<Self, ConfigError> {
        if environment.is_development() && std::env::var("JWT_SECRET").is_err() {
            tracing::warn!("JWT_SECRET not set, using the development signing secret");
            let ttl_seconds = parse_ttl()?;
            return Ok(Self {
                secret: DEVELOPMENT_SECRET.to_string(),
                ttl_seconds,
            });
        }

        Self::from_env()
    }
}

fn parse_ttl() -> Result<i64, ConfigError> {
    let raw = env_or_default("JWT_TTL_SECONDS", &DEFAULT_TOKEN_TTL.to_string());
    match raw.parse::<i64>() {
        Ok(ttl) if ttl > 0 => Ok(ttl),
        _ => Err(ConfigError::ParseError {
            key: "JWT_TTL_SECONDS".to_string(),
            details: format!("must be a positive number of seconds, got '{}'", raw),
        }),
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < 32 {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        Ok(Self {
            secret,
            ttl_seconds: parse_ttl()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "JWT secret must be at least 32 characters")]
    fn test_jwt_config_new_too_short() {
        JwtConfig::new("short");
    }

    #[test]
    fn test_jwt_config_from_env_valid() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("this-is-a-valid-secret-with-32-chars!")),
                ("JWT_TTL_SECONDS", Some("120")),
            ],
            || {
                let config = JwtConfig::from_env().unwrap();
                assert_eq!(config.secret, "this-is-a-valid-secret-with-32-chars!");
                assert_eq!(config.ttl_seconds, 120);
            },
        );
    }

    #[test]
    fn test_jwt_config_from_env_too_short() {
        temp_env::with_var("JWT_SECRET", Some("short"), || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("32 characters"));
        });
    }

    #[test]
    fn test_jwt_config_rejects_non_positive_ttl() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", Some("this-is-a-valid-secret-with-32-chars!")),
                ("JWT_TTL_SECONDS", Some("0")),
            ],
            || {
                let err = JwtConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_TTL_SECONDS"));
            },
        );
    }

    #[test]
    fn test_development_falls_back_to_dev_secret() {
        temp_env::with_vars_unset(["JWT_SECRET", "JWT_TTL_SECONDS"], || {
            let config = JwtConfig::from_env_for(&Environment::Development).unwrap();
            assert_eq!(config.secret, DEVELOPMENT_SECRET);
            assert_eq!(config.ttl_seconds, DEFAULT_TOKEN_TTL);
        });
    }

    #[test]
    fn test_production_requires_secret() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env_for(&Environment::Production).unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }
}
