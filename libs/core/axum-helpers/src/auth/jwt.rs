use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Name of the cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub email: String,      // User email
    pub roles: Vec<String>, // User roles
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
}

impl JwtClaims {
    /// Check if the subject holds a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Stateless HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    ttl_seconds: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(ttl_seconds = config.ttl_seconds, "JWT auth initialized");
        Self {
            secret: config.secret.clone(),
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Lifetime of issued tokens, in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Create an access token for the given subject
    pub fn create_access_token(
        &self,
        user_id: &str,
        email: &str,
        roles: &[String],
    ) -> Result<String, AuthError> {
        self.create_token(user_id, email, roles, self.ttl_seconds)
    }

    fn create_token(
        &self,
        user_id: &str,
        email: &str,
        roles: &[String],
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and expiry, then decode claims
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// `Set-Cookie` value carrying a freshly issued token.
    pub fn access_cookie(&self, token: &str, secure: bool) -> String {
        let secure_flag = if secure { " Secure;" } else { "" };
        format!(
            "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
            ACCESS_TOKEN_COOKIE, token, secure_flag, self.ttl_seconds
        )
    }

    /// `Set-Cookie` value that removes the token cookie.
    pub fn clear_cookie(secure: bool) -> String {
        let secure_flag = if secure { " Secure;" } else { "" };
        format!(
            "{}=; HttpOnly;{} SameSite=Strict; Path=/; Max-Age=0",
            ACCESS_TOKEN_COOKIE, secure_flag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("unit-test-secret-that-is-long-enough-123"))
    }

    #[test]
    fn test_issued_token_verifies_with_same_secret() {
        let auth = auth();
        let token = auth
            .create_access_token("7", "admin@a.b", &["ADMIN".to_string(), "USER".to_string()])
            .unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.email, "admin@a.b");
        assert!(claims.has_role("ADMIN"));
        assert!(claims.has_role("user"));
        assert_eq!(claims.exp - claims.iat, auth.ttl_seconds());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-long-enough-4567"));
        let token = other.create_access_token("1", "user@a.b", &[]).unwrap();

        assert!(matches!(auth().verify_token(&token), Err(AuthError::Token(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth();
        // Past the default 60s leeway
        let token = auth.create_token("1", "user@a.b", &[], -120).unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_cookie_strings() {
        let auth = auth();
        let cookie = auth.access_cookie("abc", true);
        assert!(cookie.starts_with("access_token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.ends_with("Max-Age=3600"));

        let cleared = JwtAuth::clear_cookie(false);
        assert!(cleared.starts_with("access_token=;"));
        assert!(!cleared.contains("Secure"));
        assert!(cleared.ends_with("Max-Age=0"));
    }
}
