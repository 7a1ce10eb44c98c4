use axum_helpers::JwtConfig;
use core_config::{AppInfo, FromEnv, app_info, env_bool, server::ServerConfig};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub environment: Environment,
    /// Create the `admin@a.b` / `user@a.b` accounts at start-up
    pub seed_demo_users: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let jwt = JwtConfig::from_env_for(&environment)?; // Required in production
        let seed_demo_users = env_bool("SEED_DEMO_USERS", environment.is_development())?;

        Ok(Self {
            app: app_info!(),
            server,
            jwt,
            environment,
            seed_demo_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        temp_env::with_vars_unset(
            ["APP_ENV", "JWT_SECRET", "SEED_DEMO_USERS", "PORT"],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_development());
                assert!(config.seed_demo_users);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.app.name, "user_admin_api");
            },
        );
    }

    #[test]
    fn test_production_requires_jwt_secret() {
        temp_env::with_vars(
            [("APP_ENV", Some("production")), ("JWT_SECRET", None)],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_production_does_not_seed_by_default() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("JWT_SECRET", Some("production-secret-with-at-least-32-chars")),
                ("SEED_DEMO_USERS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(!config.seed_demo_users);
                assert!(config.environment.use_https());
            },
        );
    }
}
