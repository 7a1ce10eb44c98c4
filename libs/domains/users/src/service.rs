use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User, UserPayload, parse_roles};
use crate::repository::UserRepository;

/// Service layer for User business logic
///
/// Payload format checks happen before the service is called; the service
/// enforces what needs stored state (existence, uniqueness, the last
/// administrator). The last-administrator check runs inside the repository
/// write, so concurrent requests cannot both pass it.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// All users, in repository order
    pub async fn list_all(&self) -> UserResult<Vec<User>> {
        self.repository.list().await
    }

    /// Get a user by ID
    pub async fn find(&self, id: i64) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Create a new user with password hashing. Any incoming id is ignored.
    pub async fn create(&self, payload: UserPayload) -> UserResult<User> {
        let roles = parse_roles(&payload.roles).map_err(UserError::Validation)?;
        let password_hash = self.hash_password(&payload.password)?;

        let user = User {
            id: 0,
            first_name: payload.first_name,
            last_name: payload.last_name,
            age: payload.age,
            email: payload.email,
            password_hash,
            roles,
        };

        self.repository.create(user).await
    }

    /// Update the user named by `payload.id`.
    ///
    /// An empty password keeps the stored hash.
    pub async fn update(&self, payload: UserPayload) -> UserResult<User> {
        let id = payload
            .id
            .ok_or_else(|| UserError::Validation("id is required".to_string()))?;
        let mut user = self.find(id).await?;
        let roles = parse_roles(&payload.roles).map_err(UserError::Validation)?;

        if !payload.password.is_empty() {
            user.password_hash = self.hash_password(&payload.password)?;
        }
        user.apply_payload(payload, roles);

        self.repository
            .update_unless_demotes_last(user, Role::Admin)
            .await
    }

    /// Delete a user; the last administrator cannot be deleted
    pub async fn delete(&self, id: i64) -> UserResult<()> {
        if !self.repository.delete_unless_last(id, Role::Admin).await? {
            return Err(UserError::NotFound(id));
        }

        Ok(())
    }

    /// Verify user credentials (for login)
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Create each account whose e-mail is not taken yet.
    ///
    /// Returns how many were created; running it twice creates nothing new.
    pub async fn seed(&self, accounts: Vec<UserPayload>) -> UserResult<usize> {
        let mut created = 0;
        for account in accounts {
            if self.repository.get_by_email(&account.email).await?.is_some() {
                tracing::debug!(email = %account.email, "Seed account already present");
                continue;
            }
            let user = self.create(account).await?;
            tracing::info!(user_id = user.id, email = %user.email, "Seeded account");
            created += 1;
        }
        Ok(created)
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
