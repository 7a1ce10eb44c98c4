use axum::Router;
use domain_users::auth_handlers::{self, AuthState};

pub fn router(state: &crate::state::AppState) -> Router {
    auth_handlers::router(AuthState {
        service: state.users.clone(),
        jwt_auth: state.jwt_auth.clone(),
        secure_cookies: state.config.environment.use_https(),
        include_message: state.config.server.include_error_message,
    })
}
