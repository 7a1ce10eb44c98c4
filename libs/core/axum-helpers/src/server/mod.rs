//! Server infrastructure module.
//!
//! This module provides:
//! - Router assembly with the OpenAPI document and shared layers
//! - The `/health` liveness endpoint
//! - Graceful shutdown on SIGINT/SIGTERM
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_app, create_router, health_router};
//! use core_config::{server::ServerConfig, app_info};
//!
//! let routes = routes.merge(health_router(app_info!()));
//! let router = create_router::<ApiDoc>(routes, &server_config);
//!
//! create_app(router, &server_config).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

// Re-export commonly used types and functions
pub use app::{OPENAPI_PATH, create_app, create_router};
pub use health::{HealthResponse, health_router};
pub use shutdown::shutdown_signal;
