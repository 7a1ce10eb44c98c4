use super::jwt::{ACCESS_TOKEN_COOKIE, JwtAuth};
use crate::errors::error_response;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use core_config::server::IncludeMessage;

/// What the guard does with a request that carries no valid token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Anonymous {
    /// Browser-facing pages: send the visitor to the login page (303).
    RedirectTo(&'static str),
    /// API routes: answer 401 with the standard error body.
    Reject,
}

/// Access requirement attached to a group of routes.
#[derive(Clone)]
pub struct AccessRule {
    auth: JwtAuth,
    role: String,
    anonymous: Anonymous,
}

impl AccessRule {
    /// Only principals holding `role` are accepted; others get 403.
    pub fn role(auth: JwtAuth, role: impl Into<String>, anonymous: Anonymous) -> Self {
        Self {
            auth,
            role: role.into(),
            anonymous,
        }
    }

    fn reject_anonymous(&self) -> Response {
        match self.anonymous {
            Anonymous::RedirectTo(location) => Redirect::to(location).into_response(),
            Anonymous::Reject => error_response(
                StatusCode::UNAUTHORIZED,
                "Full authentication is required to access this resource",
                IncludeMessage::Always,
            ),
        }
    }
}

/// Extract JWT from Authorization header or cookie
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    // Try Authorization header first: "Bearer <token>"
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer ").map(|s| s.to_string()))
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == ACCESS_TOKEN_COOKIE && !value.is_empty())
                            .then(|| value.to_string())
                    })
                })
        })
}

/// Role guard middleware
///
/// Validates the JWT from the Authorization header or cookie and checks the
/// rule's role. Inserts `JwtClaims` into request extensions on success.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::{AccessRule, Anonymous, require_role};
///
/// let rule = AccessRule::role(jwt_auth, "ADMIN", Anonymous::RedirectTo("/login"));
///
/// let admin_pages = Router::new()
///     .route("/admin", get(admin_page))
///     .route_layer(axum::middleware::from_fn_with_state(rule, require_role));
/// ```
pub async fn require_role(
    State(rule): State<AccessRule>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token_from_request(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "No JWT found, rejecting anonymous request");
        return rule.reject_anonymous();
    };

    let claims = match rule.auth.verify_token(&token) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("JWT verification failed: {}", e);
            return rule.reject_anonymous();
        }
    };

    if !claims.has_role(&rule.role) {
        tracing::info!(
            subject = %claims.sub,
            required = %rule.role,
            path = %request.uri().path(),
            "Access denied"
        );
        return error_response(StatusCode::FORBIDDEN, "Access Denied", IncludeMessage::Always);
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtClaims, JwtConfig};
    use axum::{
        Extension, Router,
        body::Body,
        http::{Request, header},
        middleware::from_fn_with_state,
        routing::get,
    };
    use tower::ServiceExt;

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("middleware-test-secret-long-enough-000"))
    }

    async fn whoami(Extension(claims): Extension<JwtClaims>) -> String {
        claims.email
    }

    fn app(rule: AccessRule) -> Router {
        Router::new()
            .route("/guarded", get(whoami))
            .route_layer(from_fn_with_state(rule, require_role))
    }

    fn request_with_cookie(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/guarded");
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("theme=dark; access_token={}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer from-header".parse().unwrap());
        headers.insert("cookie", "access_token=from-cookie".parse().unwrap());
        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_token_ignores_cleared_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "access_token=; other=1".parse().unwrap());
        assert_eq!(extract_token_from_request(&headers), None);
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_to_login() {
        let rule = AccessRule::role(jwt(), "USER", Anonymous::RedirectTo("/login"));
        let response = app(rule).oneshot(request_with_cookie(None)).await.unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_anonymous_api_call_is_unauthorized() {
        let rule = AccessRule::role(jwt(), "ADMIN", Anonymous::Reject);
        let response = app(rule).oneshot(request_with_cookie(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_counts_as_anonymous() {
        let rule = AccessRule::role(jwt(), "ADMIN", Anonymous::Reject);
        let response = app(rule)
            .oneshot(request_with_cookie(Some("not-a-jwt")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_role_is_forbidden() {
        let auth = jwt();
        let token = auth
            .create_access_token("2", "user@a.b", &["USER".to_string()])
            .unwrap();
        let rule = AccessRule::role(auth, "ADMIN", Anonymous::RedirectTo("/login"));

        let response = app(rule).oneshot(request_with_cookie(Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_matching_role_passes_claims_to_handler() {
        let auth = jwt();
        let token = auth
            .create_access_token("1", "admin@a.b", &["ADMIN".to_string()])
            .unwrap();
        let rule = AccessRule::role(auth, "ADMIN", Anonymous::Reject);

        let response = app(rule).oneshot(request_with_cookie(Some(&token))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&bytes[..], b"admin@a.b");
    }
}
