use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};

/// Repository trait for User persistence
///
/// The repository owns id assignment and e-mail uniqueness.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user, assigning its id (the incoming id is ignored)
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// Get a user by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// All users, ascending id
    async fn list(&self) -> UserResult<Vec<User>>;

    /// Replace an existing user, unless that takes `protected` away from its
    /// last holder (`Security`)
    async fn update_unless_demotes_last(&self, user: User, protected: Role) -> UserResult<User>;

    /// Delete a user by ID, returning whether it existed. Deleting the last
    /// holder of `protected` fails with `Security`.
    async fn delete_unless_last(&self, id: i64, protected: Role) -> UserResult<bool>;
}

#[derive(Debug)]
struct Table {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }

    fn holders(&self, role: Role) -> usize {
        self.users.values().filter(|u| u.has_role(role)).count()
    }
}

/// In-memory implementation of UserRepository
///
/// Ids come from a counter that only moves forward, so a deleted id is never
/// handed out again. Role checks and the writes they guard share one write
/// lock.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, mut user: User) -> UserResult<User> {
        let mut table = self.table.write().await;

        if table.email_taken(&user.email, None) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        user.id = table.next_id;
        table.next_id += 1;
        table.users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table.users.values().cloned().collect())
    }

    async fn update_unless_demotes_last(&self, user: User, protected: Role) -> UserResult<User> {
        let mut table = self.table.write().await;

        let Some(stored) = table.users.get(&user.id) else {
            return Err(UserError::NotFound(user.id));
        };

        let demotes = stored.has_role(protected) && !user.has_role(protected);
        if demotes && table.holders(protected) <= 1 {
            return Err(UserError::Security(format!(
                "Cannot remove the {} role from the last {}",
                protected,
                protected.holder()
            )));
        }

        if table.email_taken(&user.email, Some(user.id)) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        table.users.insert(user.id, user.clone());

        tracing::info!(user_id = user.id, "Updated user");
        Ok(user)
    }

    async fn delete_unless_last(&self, id: i64, protected: Role) -> UserResult<bool> {
        let mut table = self.table.write().await;

        let holds = match table.users.get(&id) {
            Some(user) => user.has_role(protected),
            None => return Ok(false),
        };

        if holds && table.holders(protected) <= 1 {
            return Err(UserError::Security(format!(
                "Cannot delete the last {}",
                protected.holder()
            )));
        }

        table.users.remove(&id);
        tracing::info!(user_id = id, "Deleted user");
        Ok(true)
    }
}
