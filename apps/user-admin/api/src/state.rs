//! Application state management.
//!
//! The state holds the configuration, the user service over the in-memory
//! repository, and the token issuer shared by the guard and the login flow.

use axum_helpers::JwtAuth;
use domain_users::{InMemoryUserRepository, UserPayload, UserService};
use tracing::info;

use crate::config::Config;

/// Shared application state.
///
/// Cloned into each router (inexpensive Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: Config,
    pub users: UserService<InMemoryUserRepository>,
    pub jwt_auth: JwtAuth,
}

impl AppState {
    /// Builds the state, seeding the demo accounts when enabled.
    pub async fn new(config: Config) -> eyre::Result<Self> {
        let users = UserService::new(InMemoryUserRepository::new());
        let jwt_auth = JwtAuth::new(&config.jwt);

        if config.seed_demo_users {
            let created = users
                .seed(demo_accounts())
                .await
                .map_err(|e| eyre::eyre!("Seeding demo accounts failed: {}", e))?;
            info!(created, "Demo accounts ready (admin@a.b, user@a.b)");
        }

        Ok(Self {
            config,
            users,
            jwt_auth,
        })
    }
}

fn demo_accounts() -> Vec<UserPayload> {
    vec![
        UserPayload {
            id: None,
            first_name: "Admin".to_string(),
            last_name: "Demo".to_string(),
            age: 35,
            email: "admin@a.b".to_string(),
            password: "admin".to_string(),
            roles: vec!["ADMIN".to_string(), "USER".to_string()],
        },
        UserPayload {
            id: None,
            first_name: "User".to_string(),
            last_name: "Demo".to_string(),
            age: 25,
            email: "user@a.b".to_string(),
            password: "user".to_string(),
            roles: vec!["USER".to_string()],
        },
    ]
}
