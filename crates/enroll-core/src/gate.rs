//! # Transition Gate
//!
//! Decides whether the workflow may leave its current stage.
//!
//! Each `attempt_*` operation belongs to exactly one stage. Invoked at any
//! other stage it reports [`Transition::Ignored`] and touches nothing, which
//! makes stale button presses harmless. A failed attempt only updates error
//! flags (and, for the final submit, the published policy result); repeating
//! it yields the same outcome.
//!
//! The gate performs no I/O. When a transition calls for a collaborator
//! (sending the verification email, creating the account) the request is
//! returned as an [`Effect`] for the host to dispatch.

use crate::policy::{self, PolicyRule};
use crate::system::{Stage, StageController};
use crate::validation::{is_missing, is_valid_email};
use crate::workflow::Lifecycle;
use crate::{Field, FieldStore};
use serde::{Deserialize, Serialize};

// =============================================================================
// VALIDATION FAILURES
// =============================================================================

/// Why a transition attempt was refused. Always recoverable by editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// A required field is empty.
    MissingRequiredField { field: Field },
    /// A field has content of the wrong shape.
    MalformedValue { field: Field },
    /// The password breaks a policy rule.
    PolicyViolation { rule: PolicyRule },
    /// The confirmation differs from the password.
    Mismatch,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField { field } => write!(f, "{field} is required"),
            Self::MalformedValue { field } => write!(f, "{field} is malformed"),
            Self::PolicyViolation { rule } => write!(f, "password policy: {rule}"),
            Self::Mismatch => f.write_str("passwords do not match"),
        }
    }
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Validated payload for the account-creation service.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AccountRequest {
    pub identifier: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AccountRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRequest")
            .field("identifier", &self.identifier)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A collaborator call requested by a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a verification code to this address.
    DispatchVerificationEmail { email: String },
    /// Create the account.
    CreateAccount(AccountRequest),
}

// =============================================================================
// TRANSITION OUTCOME
// =============================================================================

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The stage advanced.
    Advanced { to: Stage, effect: Option<Effect> },
    /// Validation failed; the stage is unchanged.
    Rejected {
        stage: Stage,
        failures: Vec<ValidationFailure>,
    },
    /// Final submit succeeded. The workflow is finished.
    Submitted { request: AccountRequest },
    /// The attempt does not apply to the current lifecycle state.
    Ignored { current: Lifecycle },
}

impl Transition {
    /// Whether the attempt moved the workflow forward.
    #[must_use]
    pub fn is_progress(&self) -> bool {
        matches!(self, Self::Advanced { .. } | Self::Submitted { .. })
    }

    /// The collaborator call to dispatch, if any.
    #[must_use]
    pub fn effect(&self) -> Option<Effect> {
        match self {
            Self::Advanced { effect, .. } => effect.clone(),
            Self::Submitted { request } => Some(Effect::CreateAccount(request.clone())),
            Self::Rejected { .. } | Self::Ignored { .. } => None,
        }
    }

    /// Failures reported by a rejected attempt (empty otherwise).
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::Rejected { failures, .. } => failures,
            _ => &[],
        }
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Stateless gate over a stage controller and a field store.
pub struct TransitionGate;

impl TransitionGate {
    /// Stage 1 → 2. Requires a well-formed email; the identifier is not
    /// checked until the final submit.
    pub fn attempt_advance_from_identification(
        stages: &mut StageController,
        store: &mut FieldStore,
    ) -> Transition {
        if stages.current() != Stage::Identification {
            return ignored(stages);
        }

        let email = store.value(Field::Email).to_string();
        let failure = if is_missing(&email) {
            Some(ValidationFailure::MissingRequiredField {
                field: Field::Email,
            })
        } else if !is_valid_email(&email) {
            Some(ValidationFailure::MalformedValue {
                field: Field::Email,
            })
        } else {
            None
        };

        if let Some(failure) = failure {
            store.flag(Field::Email, true);
            return Transition::Rejected {
                stage: stages.current(),
                failures: vec![failure],
            };
        }

        store.flag(Field::Email, false);
        advance(stages, Some(Effect::DispatchVerificationEmail { email }))
    }

    /// Stage 2 → 3. Requires a non-empty code; its content is verified
    /// elsewhere.
    pub fn attempt_advance_from_email_verification(
        stages: &mut StageController,
        store: &mut FieldStore,
    ) -> Transition {
        if stages.current() != Stage::EmailVerification {
            return ignored(stages);
        }

        if is_missing(store.value(Field::Code)) {
            store.flag(Field::Code, true);
            return Transition::Rejected {
                stage: stages.current(),
                failures: vec![ValidationFailure::MissingRequiredField { field: Field::Code }],
            };
        }

        store.flag(Field::Code, false);
        advance(stages, None)
    }

    /// Final submit from stage 3.
    ///
    /// The policy is evaluated again from the latest values rather than
    /// trusting the result published during editing.
    pub fn attempt_final_submit(stages: &StageController, store: &mut FieldStore) -> Transition {
        if stages.current() != Stage::CredentialCreation {
            return ignored(stages);
        }

        let draft = store.draft();
        let result = policy::evaluate(draft.password(), draft.confirm_password());

        let mut failures = Vec::new();
        for field in [Field::Identifier, Field::Password, Field::ConfirmPassword] {
            if is_missing(draft.get(field)) {
                failures.push(ValidationFailure::MissingRequiredField { field });
            }
        }
        for rule in result.failing_rules() {
            failures.push(match rule {
                PolicyRule::PasswordsMatch => ValidationFailure::Mismatch,
                rule => ValidationFailure::PolicyViolation { rule },
            });
        }

        if failures.is_empty() {
            let request = AccountRequest {
                identifier: draft.identifier().to_string(),
                email: draft.email().to_string(),
                password: draft.password().to_string(),
            };
            return Transition::Submitted { request };
        }

        let identifier_missing = is_missing(draft.identifier());
        let password_missing = is_missing(draft.password());
        store.flag(Field::Identifier, identifier_missing);
        store.flag(Field::Password, password_missing);
        store.flag(Field::ConfirmPassword, !result.passwords_match);
        store.publish_policy(result);

        Transition::Rejected {
            stage: stages.current(),
            failures,
        }
    }
}

fn ignored(stages: &StageController) -> Transition {
    Transition::Ignored {
        current: Lifecycle::InProgress(stages.current()),
    }
}

fn advance(stages: &mut StageController, effect: Option<Effect>) -> Transition {
    match stages.advance() {
        Some(to) => Transition::Advanced { to, effect },
        None => ignored(stages),
    }
}

// =============================================================================
// TESTS
// =============================================================================
