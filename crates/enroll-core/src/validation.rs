//! # Field Predicates
//!
//! Small, pure checks shared by the transition gate and the password
//! policy validator.

use regex::Regex;
use std::sync::LazyLock;

/// Shape of an acceptable email address: one `@`, no whitespace, and a
/// domain part containing at least one dot.
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_SHAPE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// A required value is missing when it is the empty string.
///
/// Whitespace counts as content; trimming is left to the caller.
#[must_use]
pub fn is_missing(value: &str) -> bool {
    value.is_empty()
}

/// Check that `value` looks like an email address.
///
/// This is a shape check only. Deliverability is the dispatch service's
/// concern.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_SHAPE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Exact comparison of a password and its confirmation.
#[must_use]
pub fn passwords_match(password: &str, confirm: &str) -> bool {
    password == confirm
}
