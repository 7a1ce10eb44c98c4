use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use axum_helpers::ErrorResponse;
use core_config::server::IncludeMessage;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi};

use crate::error::{ApiFailure, UserError, UserResult};
use crate::models::{User, UserPayload};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::validation::{Operation, UserValidator, first_blocking};

/// OpenAPI documentation for the user REST API, nested under `/rest`
#[derive(OpenApi)]
#[openapi(
    paths(list_users, show_user, create_user, update_user, delete_user),
    components(schemas(User, UserPayload, crate::models::Role, ErrorResponse)),
    tags((name = "users", description = "User administration, ADMIN only"))
)]
pub struct RestApiDoc;

/// State shared by the REST handlers
pub struct RestState<R: UserRepository> {
    pub service: UserService<R>,
    pub validator: Arc<dyn UserValidator>,
    pub include_message: IncludeMessage,
}

impl<R: UserRepository> Clone for RestState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            validator: Arc::clone(&self.validator),
            include_message: self.include_message,
        }
    }
}

impl<R: UserRepository> RestState<R> {
    pub fn new(
        service: UserService<R>,
        validator: Arc<dyn UserValidator>,
        include_message: IncludeMessage,
    ) -> Self {
        Self {
            service,
            validator,
            include_message,
        }
    }

    fn fail(&self, operation: &str, error: UserError) -> ApiFailure {
        ApiFailure::classify(operation, error, self.include_message)
    }

    /// Runs the validator and rejects on the first violation that blocks `operation`.
    fn check(&self, operation: Operation, payload: &UserPayload) -> UserResult<()> {
        let violations = self.validator.validate(payload);
        if let Some(violation) = first_blocking(operation, &violations) {
            return Err(UserError::InvalidFormat(violation.message.clone()));
        }
        if !violations.is_empty() {
            tracing::debug!(?violations, "Tolerated violations");
        }
        Ok(())
    }
}

/// Create the user REST router, to be nested under `/rest`
///
/// `/user` is matched before `/{id}`, so `GET /user` answers 405 rather than
/// the 400 of an unparseable id.
pub fn router<R: UserRepository + 'static>(state: RestState<R>) -> Router {
    Router::new()
        .route("/", get(list_users::<R>))
        .route("/{id}", get(show_user::<R>))
        .route(
            "/user",
            axum::routing::post(create_user::<R>)
                .patch(update_user::<R>)
                .delete(delete_user::<R>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    /// Id of the user to delete
    pub id: i64,
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    responses(
        (status = 200, description = "All users, ascending id", body = Vec<User>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<RestState<R>>,
) -> Result<Json<Vec<User>>, ApiFailure> {
    tracing::debug!("list <- all");
    let users = state
        .service
        .list_all()
        .await
        .map_err(|e| state.fail("list", e))?;
    tracing::debug!("list -> {} users", users.len());
    Ok(Json(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, description = "Malformed or unknown id", body = ErrorResponse)
    )
)]
async fn show_user<R: UserRepository>(
    State(state): State<RestState<R>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ApiFailure> {
    let Path(id) = id.map_err(|e| state.fail("show", UserError::Validation(e.body_text())))?;
    tracing::debug!("show <- {}", id);
    let user = state
        .service
        .find(id)
        .await
        .map_err(|e| state.fail("show", e))?;
    tracing::debug!(user_id = user.id, email = %user.email, "show -> found");
    Ok(Json(user))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/user",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 200, description = "Created user with its assigned id", body = User),
        (status = 400, description = "Invalid field or duplicate e-mail", body = ErrorResponse),
        (status = 422, description = "Body is not a user", body = ErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(state): State<RestState<R>>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiFailure> {
    let Json(payload) =
        payload.map_err(|e| state.fail("create", UserError::Malformed(e.body_text())))?;
    tracing::debug!("create <- {:?}", payload);

    state
        .check(Operation::Create, &payload)
        .map_err(|e| state.fail("create", e))?;
    let user = state
        .service
        .create(payload)
        .await
        .map_err(|e| state.fail("create", e))?;

    tracing::debug!(user_id = user.id, "create -> created");
    Ok(Json(user))
}

/// Update an existing user; a password violation alone does not block it
#[utoipa::path(
    patch,
    path = "/user",
    tag = "users",
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid field, unknown id or duplicate e-mail", body = ErrorResponse),
        (status = 409, description = "Would remove the last administrator", body = ErrorResponse),
        (status = 422, description = "Body is not a user", body = ErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(state): State<RestState<R>>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiFailure> {
    let Json(payload) =
        payload.map_err(|e| state.fail("update", UserError::Malformed(e.body_text())))?;
    tracing::debug!("update <- {:?}", payload);

    state
        .check(Operation::Update, &payload)
        .map_err(|e| state.fail("update", e))?;
    let user = state
        .service
        .update(payload)
        .await
        .map_err(|e| state.fail("update", e))?;

    tracing::debug!(user_id = user.id, "update -> updated");
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/user",
    tag = "users",
    params(DeleteParams),
    responses(
        (status = 200, description = "User deleted, empty body"),
        (status = 400, description = "Missing or unknown id", body = ErrorResponse),
        (status = 409, description = "Would remove the last administrator", body = ErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<RestState<R>>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> Result<StatusCode, ApiFailure> {
    let Query(params) =
        params.map_err(|e| state.fail("delete", UserError::Validation(e.body_text())))?;
    tracing::debug!("delete <- {}", params.id);

    state
        .service
        .delete(params.id)
        .await
        .map_err(|e| state.fail("delete", e))?;

    tracing::debug!("delete -> {} removed", params.id);
    Ok(StatusCode::OK)
}
