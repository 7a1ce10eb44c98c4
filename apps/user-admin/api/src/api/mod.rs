use axum::Router;

pub mod pages;
pub mod rest;

/// Creates the application routes.
///
/// Takes a reference to AppState and returns a stateless Router (every
/// sub-router has its state and guard already applied).
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/rest", rest::router(state)) // ADMIN only, 401 for anonymous callers
        .merge(pages::router(state))
}
