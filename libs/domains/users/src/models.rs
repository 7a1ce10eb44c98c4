use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// How a holder of the role is called in messages
    pub fn holder(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "administrator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Assigned by the repository, never reused
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    /// Unique, compared case-insensitively
    pub email: String,
    /// Argon2 password hash (never exposed in API responses)
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub roles: Vec<Role>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Role names as carried in access tokens
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.to_string()).collect()
    }

    /// Copies the editable attributes of `payload` onto this user.
    ///
    /// `roles` must already be parsed; the password is handled by the service.
    pub fn apply_payload(&mut self, payload: UserPayload, roles: Vec<Role>) {
        self.first_name = payload.first_name;
        self.last_name = payload.last_name;
        self.age = payload.age;
        self.email = payload.email;
        self.roles = roles;
    }
}

/// Inbound user body for create and update.
///
/// Missing fields deserialize to their defaults so that validation, not the
/// JSON extractor, reports them.
#[derive(Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPayload {
    /// Ignored on create, required on update
    pub id: Option<i64>,
    #[validate(
        custom(function = "first_name_present"),
        length(max = 50, message = "First name must be at most 50 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "last_name_present"),
        length(max = 50, message = "Last name must be at most 50 characters")
    )]
    pub last_name: String,
    #[validate(range(min = 0, max = 127, message = "Age must be between 0 and 127"))]
    pub age: i32,
    #[validate(
        email(message = "Email must be a valid address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    /// Empty on update keeps the current password
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    #[validate(custom(function = "known_roles"))]
    pub roles: Vec<String>,
}

// Hand-written so the password never reaches a log line
impl std::fmt::Debug for UserPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserPayload")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("age", &self.age)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("roles", &self.roles)
            .finish()
    }
}

fn not_blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank").with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

fn first_name_present(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "First name must not be blank")
}

fn last_name_present(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "Last name must not be blank")
}

fn known_roles(roles: &[String]) -> Result<(), ValidationError> {
    match roles.iter().find(|r| r.parse::<Role>().is_err()) {
        Some(unknown) => Err(ValidationError::new("unknown_role")
            .with_message(Cow::Owned(format!("Unknown role: {}", unknown)))),
        None => Ok(()),
    }
}

/// Parses role names, defaulting an empty list to `[USER]`.
pub fn parse_roles(names: &[String]) -> Result<Vec<Role>, String> {
    let mut roles = Vec::with_capacity(names.len());
    for name in names {
        let role: Role = name.parse()?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        roles.push(Role::User);
    }
    Ok(roles)
}
