//! # Core Type Definitions
//!
//! This module contains the shared types of the registration workflow:
//! - Field identifiers (`Field`)
//! - The in-progress record (`RegistrationDraft`)
//! - Per-field error flags (`FieldErrorSet`)
//! - Error types (`EnrollError`)
//!
//! Every field-indexed structure here has a fixed shape: one slot per
//! [`Field`] variant, addressed through exhaustive `match`es. Adding a field
//! is a compile error everywhere it is not yet handled.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// FIELD
// =============================================================================

/// One of the five textual inputs of the registration form.
///
/// Wire names are snake_case. The camelCase names used by older front-ends
/// (`userId`, `confirmPassword`) are accepted as aliases on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Desired account handle.
    #[serde(alias = "userId")]
    Identifier,
    /// Contact address the verification code is sent to.
    Email,
    /// Verification code received out-of-band.
    #[serde(alias = "verification_code")]
    Code,
    /// Chosen password.
    Password,
    /// Password repeated for confirmation.
    #[serde(alias = "confirmPassword")]
    ConfirmPassword,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 5] = [
        Field::Identifier,
        Field::Email,
        Field::Code,
        Field::Password,
        Field::ConfirmPassword,
    ];

    /// Canonical wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::Email => "email",
            Field::Code => "code",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
        }
    }

    /// Whether the field holds secret material that must never be echoed.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        matches!(self, Field::Password | Field::ConfirmPassword)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = EnrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identifier" | "userId" => Ok(Field::Identifier),
            "email" => Ok(Field::Email),
            "code" | "verification_code" => Ok(Field::Code),
            "password" => Ok(Field::Password),
            "confirm_password" | "confirmPassword" => Ok(Field::ConfirmPassword),
            other => Err(EnrollError::UnknownField(other.to_string())),
        }
    }
}

// =============================================================================
// REGISTRATION DRAFT
// =============================================================================

/// The mutable record of an in-progress signup.
///
/// Volatile by construction: it is never serialized, so the password
/// fields cannot leak through a response body or a log line. `Debug`
/// redacts them for the same reason.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    identifier: String,
    email: String,
    verification_code: String,
    password: String,
    confirm_password: String,
}

impl RegistrationDraft {
    /// Create an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one field.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Identifier => &self.identifier,
            Field::Email => &self.email,
            Field::Code => &self.verification_code,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    /// Overwrite exactly one field.
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Identifier => &mut self.identifier,
            Field::Email => &mut self.email,
            Field::Code => &mut self.verification_code,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
        };
        *slot = value;
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn verification_code(&self) -> &str {
        &self.verification_code
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }
}

impl std::fmt::Debug for RegistrationDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationDraft")
            .field("identifier", &self.identifier)
            .field("email", &self.email)
            .field("verification_code", &self.verification_code)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// FIELD ERROR SET
// =============================================================================

/// Per-field "currently invalid" flags.
///
/// A flag is cleared whenever its field is edited and only ever raised
/// again by a transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldErrorSet {
    pub identifier: bool,
    pub email: bool,
    pub code: bool,
    pub password: bool,
    pub confirm_password: bool,
}

impl FieldErrorSet {
    /// Create a set with every flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one flag.
    #[must_use]
    pub fn get(&self, field: Field) -> bool {
        match field {
            Field::Identifier => self.identifier,
            Field::Email => self.email,
            Field::Code => self.code,
            Field::Password => self.password,
            Field::ConfirmPassword => self.confirm_password,
        }
    }

    /// Assign one flag.
    pub fn set(&mut self, field: Field, invalid: bool) {
        let slot = match field {
            Field::Identifier => &mut self.identifier,
            Field::Email => &mut self.email,
            Field::Code => &mut self.code,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
        };
        *slot = invalid;
    }

    /// Clear one flag.
    pub fn clear(&mut self, field: Field) {
        self.set(field, false);
    }

    /// True if any flag is raised.
    #[must_use]
    pub fn any(&self) -> bool {
        Field::ALL.iter().any(|f| self.get(*f))
    }

    /// Raised flags, in form order.
    #[must_use]
    pub fn flagged(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.get(*f)).collect()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Enroll system.
///
/// Validation failures are NOT errors: they are reported as values on the
/// transition outcome. `EnrollError` covers operations that were refused
/// outright and failures of the surrounding host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnrollError {
    /// The field belongs to a stage that has already been completed.
    #[error("Field '{0}' is locked: its stage has been completed")]
    FieldLocked(Field),

    /// The field belongs to a stage that has not been reached yet.
    #[error("Field '{0}' is not editable at the current stage")]
    FieldNotEditable(Field),

    /// The workflow has already been submitted.
    #[error("Registration has already been submitted")]
    AlreadySubmitted,

    /// A field name did not match any known field.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// No registration with the given id exists.
    #[error("Registration not found: {0}")]
    SessionNotFound(String),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A collaborator service call failed.
    #[error("Backend error: {0}")]
    Backend(String),
}

// =============================================================================
// TESTS
// =============================================================================
