use axum::{
    Extension, Form, Json, Router,
    extract::{Query, State, rejection::FormRejection},
    http::header,
    middleware::from_fn_with_state,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_helpers::{AccessRule, Anonymous, JwtAuth, JwtClaims, require_role};
use core_config::server::IncludeMessage;
use serde::{Deserialize, Serialize};

use crate::error::{ApiFailure, UserError};
use crate::models::{Role, User};
use crate::repository::UserRepository;
use crate::service::UserService;

/// Where the guard sends anonymous visitors of the pages.
pub const LOGIN_PAGE: &str = "/login";

/// Application state for the login flow and pages
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt_auth: JwtAuth,
    /// Whether cookies carry the Secure flag
    pub secure_cookies: bool,
    pub include_message: IncludeMessage,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt_auth: self.jwt_auth.clone(),
            secure_cookies: self.secure_cookies,
            include_message: self.include_message,
        }
    }
}

impl<R: UserRepository> AuthState<R> {
    fn fail(&self, operation: &str, error: UserError) -> ApiFailure {
        ApiFailure::classify(operation, error, self.include_message)
    }
}

/// Body of the page endpoints. Views are not rendered; the page name and
/// the signed-in user are returned instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageView {
    pub page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl PageView {
    fn new(page: &str) -> Self {
        Self {
            page: page.to_string(),
            user: None,
            notice: None,
        }
    }
}

/// `?error` and `?logout` flags set by the login redirects
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub logout: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public landing page
async fn index() -> Json<PageView> {
    Json(PageView::new("index"))
}

/// Login page
async fn login_page(Query(query): Query<LoginQuery>) -> Json<PageView> {
    let mut view = PageView::new("login");
    if query.error.is_some() {
        view.notice = Some("Invalid username or password".to_string());
    } else if query.logout.is_some() {
        view.notice = Some("You have been logged out".to_string());
    }
    Json(view)
}

/// Form login
///
/// POST /login (username, password)
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, ApiFailure> {
    let Ok(Form(form)) = form else {
        tracing::debug!("Login form could not be read");
        return Ok(Redirect::to("/login?error").into_response());
    };

    let user = match state
        .service
        .verify_credentials(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(UserError::InvalidCredentials) => {
            tracing::info!(username = %form.username, "Login failed");
            return Ok(Redirect::to("/login?error").into_response());
        }
        Err(e) => return Err(state.fail("login", e)),
    };

    let token = state
        .jwt_auth
        .create_access_token(&user.id.to_string(), &user.email, &user.role_names())
        .map_err(|e| {
            tracing::error!("Failed to create access token: {:?}", e);
            state.fail("login", UserError::Internal("Failed to create token".to_string()))
        })?;

    let target = if user.has_role(Role::Admin) {
        "/admin"
    } else {
        "/user"
    };
    tracing::info!(
        user_id = user.id,
        redirect = target,
        ttl_seconds = state.jwt_auth.ttl_seconds(),
        "Login succeeded"
    );

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            state.jwt_auth.access_cookie(&token, state.secure_cookies),
        )]),
        Redirect::to(target),
    )
        .into_response())
}

/// Logout, clearing the token cookie
///
/// POST /logout
async fn logout<R: UserRepository>(State(state): State<AuthState<R>>) -> Response {
    (
        AppendHeaders([(
            header::SET_COOKIE,
            JwtAuth::clear_cookie(state.secure_cookies),
        )]),
        Redirect::to("/login?logout"),
    )
        .into_response()
}

/// Renders `page` for the token's subject.
///
/// A token that outlived its account counts as anonymous: the cookie is
/// cleared and the visitor is sent back to the login page.
async fn signed_in_page<R: UserRepository>(
    state: &AuthState<R>,
    claims: &JwtClaims,
    page: &str,
) -> Result<Response, ApiFailure> {
    let id = claims.sub.parse::<i64>().map_err(|_| {
        state.fail(
            page,
            UserError::Validation(format!("Malformed subject: {}", claims.sub)),
        )
    })?;

    match state.service.find(id).await {
        Ok(user) => {
            let mut view = PageView::new(page);
            view.user = Some(user);
            Ok(Json(view).into_response())
        }
        Err(UserError::NotFound(_)) => {
            tracing::debug!(user_id = id, "Token subject no longer exists");
            Ok((
                AppendHeaders([(
                    header::SET_COOKIE,
                    JwtAuth::clear_cookie(state.secure_cookies),
                )]),
                Redirect::to(LOGIN_PAGE),
            )
                .into_response())
        }
        Err(e) => Err(state.fail(page, e)),
    }
}

/// Page for any signed-in user
async fn user_page<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Response, ApiFailure> {
    signed_in_page(&state, &claims, "user").await
}

/// Page for administrators
async fn admin_page<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Response, ApiFailure> {
    signed_in_page(&state, &claims, "admin").await
}

/// Create the router for the login flow and the pages
///
/// `/` and `/login` are public; `/user` needs `USER` and `/admin` needs
/// `ADMIN`. Anonymous visitors of guarded pages are redirected to `/login`.
pub fn router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    let user_rule = AccessRule::role(
        state.jwt_auth.clone(),
        Role::User.as_str(),
        Anonymous::RedirectTo(LOGIN_PAGE),
    );
    let admin_rule = AccessRule::role(
        state.jwt_auth.clone(),
        Role::Admin.as_str(),
        Anonymous::RedirectTo(LOGIN_PAGE),
    );

    let user_pages = Router::new()
        .route("/user", get(user_page::<R>))
        .route_layer(from_fn_with_state(user_rule, require_role));
    let admin_pages = Router::new()
        .route("/admin", get(admin_page::<R>))
        .route_layer(from_fn_with_state(admin_rule, require_role));

    Router::new()
        .route("/", get(index))
        .route(LOGIN_PAGE, get(login_page).post(login::<R>))
        .route("/logout", post(logout::<R>))
        .merge(user_pages)
        .merge(admin_pages)
        .with_state(state)
}
