//! User administration service: the `/rest` API, form login and the
//! role-guarded pages, assembled on the shared axum helpers.

use axum::Router;
use axum_helpers::{create_router, health_router};

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

pub use config::Config;
pub use state::AppState;

/// The complete application router, as served by the binary.
pub fn build_router(state: &AppState) -> Router {
    // Health is merged before the shared layers so it gets them too
    let routes = api::routes(state).merge(health_router(state.config.app.clone()));
    create_router::<openapi::ApiDoc>(routes, &state.config.server)
}
