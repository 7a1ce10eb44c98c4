//! Users Domain
//!
//! User administration: the `/rest` CRUD API, the form login that issues
//! the access cookie, and the role-guarded pages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ Handlers / AuthHandlers  │  ← HTTP endpoints, failure classification
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │  Validation              │  ← field rules + per-operation enforcement
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │  Service                 │  ← password hashing, last-admin rule
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │  Repository              │  ← data access (trait + in-memory impl)
//! └──────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_users::{
//!     handlers::{self, RestState},
//!     InMemoryUserRepository, RuleUserValidator, UserService,
//! };
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let state = RestState::new(service, Arc::new(RuleUserValidator), IncludeMessage::Always);
//! let rest = Router::new().nest("/rest", handlers::router(state));
//! ```

pub mod auth_handlers;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

// Re-export commonly used types
pub use auth_handlers::{AuthState, PageView};
pub use error::{ApiFailure, FailureKind, UserError, UserResult};
pub use handlers::{RestApiDoc, RestState};
pub use models::{Role, User, UserPayload};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
pub use validation::{
    Enforcement, FieldViolation, Operation, RuleUserValidator, UserValidator, enforcement,
    first_blocking,
};
