use crate::{env_or_default, ConfigError, FromEnv};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

/// Whether error responses carry the failure's own message.
///
/// With `Never` the message is replaced by the status reason phrase, so
/// internal details do not leak to clients.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IncludeMessage {
    #[default]
    Always,
    Never,
}

impl FromStr for IncludeMessage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(IncludeMessage::Always),
            "never" => Ok(IncludeMessage::Never),
            other => Err(format!("expected 'always' or 'never', got '{}'", other)),
        }
    }
}

/// Server configuration for HTTP APIs
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub include_error_message: IncludeMessage,
}

impl ServerConfig {
    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl FromEnv for ServerConfig {
    /// Reads from environment variables with sensible defaults:
    /// - HOST: defaults to 0.0.0.0
    /// - PORT: defaults to 8080
    /// - REQUEST_TIMEOUT_SECONDS: defaults to 30
    /// - SERVER_ERROR_INCLUDE_MESSAGE: `always` (default) or `never`
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or_default("HOST", &Ipv4Addr::UNSPECIFIED.to_string());
        let port = env_or_default("PORT", "8080").parse().map_err(|e| {
            ConfigError::ParseError {
                key: "PORT".to_string(),
                details: format!("{}", e),
            }
        })?;
        let timeout_secs: u64 = env_or_default("REQUEST_TIMEOUT_SECONDS", "30")
            .parse()
            .map_err(|e| ConfigError::ParseError {
                key: "REQUEST_TIMEOUT_SECONDS".to_string(),
                details: format!("{}", e),
            })?;
        let include_error_message = env_or_default("SERVER_ERROR_INCLUDE_MESSAGE", "always")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "SERVER_ERROR_INCLUDE_MESSAGE".to_string(),
                details,
            })?;

        Ok(Self {
            host,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            include_error_message,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(30),
            include_error_message: IncludeMessage::Always,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 4] = [
        "HOST",
        "PORT",
        "REQUEST_TIMEOUT_SECONDS",
        "SERVER_ERROR_INCLUDE_MESSAGE",
    ];

    #[test]
    fn test_server_config_from_env_with_defaults() {
        temp_env::with_vars(VARS.map(|k| (k, None::<&str>)), || {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8080);
            assert_eq!(config.address(), "0.0.0.0:8080");
            assert_eq!(config.request_timeout, Duration::from_secs(30));
            assert_eq!(config.include_error_message, IncludeMessage::Always);
        });
    }

    #[test]
    fn test_server_config_from_env_with_custom_values() {
        temp_env::with_vars(
            [
                ("HOST", Some("127.0.0.1")),
                ("PORT", Some("3000")),
                ("REQUEST_TIMEOUT_SECONDS", Some("5")),
                ("SERVER_ERROR_INCLUDE_MESSAGE", Some("NEVER")),
            ],
            || {
                let config = ServerConfig::from_env().unwrap();
                assert_eq!(config.address(), "127.0.0.1:3000");
                assert_eq!(config.request_timeout, Duration::from_secs(5));
                assert_eq!(config.include_error_message, IncludeMessage::Never);
            },
        );
    }

    #[test]
    fn test_server_config_from_env_port_out_of_range() {
        temp_env::with_var("PORT", Some("99999"), || {
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("PORT"));
        });
    }

    #[test]
    fn test_server_config_rejects_unknown_message_policy() {
        temp_env::with_vars(
            [
                ("PORT", None::<&str>),
                ("REQUEST_TIMEOUT_SECONDS", None),
                ("SERVER_ERROR_INCLUDE_MESSAGE", Some("sometimes")),
            ],
            || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("SERVER_ERROR_INCLUDE_MESSAGE"));
            },
        );
    }
}
