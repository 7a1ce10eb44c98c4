//! Payload validation and the per-operation enforcement table.
//!
//! A [`UserValidator`] reports every violated field. Whether a violation
//! stops the request is decided separately by [`enforcement`], which reads
//! a static rule table keyed by operation and field code.

use validator::Validate;

use crate::models::UserPayload;

/// One violated constraint on a payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Wire name of the field (`firstName`, `password`, ...)
    pub field_code: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_code: field_code.into(),
            message: message.into(),
        }
    }
}

/// Validates a user payload, producing zero or more violations.
#[cfg_attr(test, mockall::automock)]
pub trait UserValidator: Send + Sync {
    fn validate(&self, payload: &UserPayload) -> Vec<FieldViolation>;
}

/// Payload fields in declaration order, as (struct field, wire code).
const FIELD_CODES: &[(&str, &str)] = &[
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("age", "age"),
    ("email", "email"),
    ("password", "password"),
    ("roles", "roles"),
];

/// Default validator backed by the `validator` derive on [`UserPayload`].
///
/// Violations come back in field declaration order, at most one per field.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleUserValidator;

impl UserValidator for RuleUserValidator {
    fn validate(&self, payload: &UserPayload) -> Vec<FieldViolation> {
        let Err(errors) = payload.validate() else {
            return Vec::new();
        };
        let by_field = errors.field_errors();

        FIELD_CODES
            .iter()
            .filter_map(|(field, code)| {
                let first = by_field
                    .get(*field)
                    .or_else(|| by_field.get(*code))
                    .and_then(|errs| errs.first())?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", code, first.code));
                Some(FieldViolation::new(*code, message))
            })
            .collect()
    }
}

/// The request being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// What a violation on a field does to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Rejects the request
    Blocking,
    /// Recorded but the request proceeds
    Tolerated,
}

/// Exceptions to the default of [`Enforcement::Blocking`].
///
/// An update may carry a short or empty password: empty keeps the stored one.
const ENFORCEMENT_RULES: &[(Operation, &str, Enforcement)] =
    &[(Operation::Update, "password", Enforcement::Tolerated)];

pub fn enforcement(operation: Operation, field_code: &str) -> Enforcement {
    ENFORCEMENT_RULES
        .iter()
        .find(|(op, code, _)| *op == operation && *code == field_code)
        .map(|(_, _, rule)| *rule)
        .unwrap_or(Enforcement::Blocking)
}

/// First violation that blocks `operation`, in the order reported.
pub fn first_blocking(
    operation: Operation,
    violations: &[FieldViolation],
) -> Option<&FieldViolation> {
    violations
        .iter()
        .find(|v| enforcement(operation, &v.field_code) == Enforcement::Blocking)
}
