//! # Field Store
//!
//! Holds the registration draft, the per-field error flags and the
//! password policy result shown to the user.
//!
//! Two rules govern every edit:
//! - the edited field's error flag is cleared immediately, whatever its
//!   previous state;
//! - editing either password field re-evaluates the policy from the
//!   current pair.

use crate::policy::{self, PasswordPolicyResult};
use crate::{Field, FieldErrorSet, RegistrationDraft};

/// The mutable form state of one registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStore {
    draft: RegistrationDraft,
    errors: FieldErrorSet,
    policy: PasswordPolicyResult,
}

impl FieldStore {
    /// Create an empty store. The policy starts out "passing" so that no
    /// checklist is shown before the user types.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one field and clear its error flag.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value.into());
        self.errors.clear(field);

        if matches!(field, Field::Password | Field::ConfirmPassword) {
            self.policy = policy::evaluate(self.draft.password(), self.draft.confirm_password());
        }
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        self.draft.get(field)
    }

    #[must_use]
    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrorSet {
        &self.errors
    }

    /// Policy result as last published to the user.
    #[must_use]
    pub fn policy(&self) -> &PasswordPolicyResult {
        &self.policy
    }

    pub(crate) fn flag(&mut self, field: Field, invalid: bool) {
        self.errors.set(field, invalid);
    }

    pub(crate) fn publish_policy(&mut self, result: PasswordPolicyResult) {
        self.policy = result;
    }
}
