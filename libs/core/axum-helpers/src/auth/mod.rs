//! Authentication and authorization module.
//!
//! This module provides:
//! - Stateless JWT token creation and verification
//! - The `access_token` cookie format used by the login flow
//! - A role guard middleware for protected routes
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{AccessRule, Anonymous, JwtAuth, JwtConfig, require_role};
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env_for(&environment)?);
//!
//! let protected = Router::new()
//!     .route("/admin", get(handler))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         AccessRule::role(auth, "ADMIN", Anonymous::RedirectTo("/login")),
//!         require_role,
//!     ));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

// Re-export commonly used types
pub use config::{DEFAULT_TOKEN_TTL, JwtConfig};
pub use jwt::{ACCESS_TOKEN_COOKIE, AuthError, JwtAuth, JwtClaims};
pub use middleware::{AccessRule, Anonymous, extract_token_from_request, require_role};
