use axum::{Router, middleware::from_fn_with_state};
use axum_helpers::{AccessRule, Anonymous, require_role};
use domain_users::{Role, RuleUserValidator, handlers, handlers::RestState};
use std::sync::Arc;

pub fn router(state: &crate::state::AppState) -> Router {
    let rest_state = RestState::new(
        state.users.clone(),
        Arc::new(RuleUserValidator),
        state.config.server.include_error_message,
    );

    let admin_only = AccessRule::role(
        state.jwt_auth.clone(),
        Role::Admin.as_str(),
        Anonymous::Reject,
    );

    handlers::router(rest_state).route_layer(from_fn_with_state(admin_only, require_role))
}
