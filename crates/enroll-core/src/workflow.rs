//! # Workflow Module
//!
//! One registration session: a stage controller and a field store driven
//! through the transition gate.
//!
//! The workflow is the only type a host needs. It is volatile session
//! state: never persisted, discarded on abandonment or after a successful
//! submit.

use crate::gate::{Transition, TransitionGate};
use crate::policy::PasswordPolicyResult;
use crate::system::{FieldAccess, Stage, StageController};
use crate::{EnrollError, Field, FieldErrorSet, FieldStore, RegistrationDraft};
use serde::{Deserialize, Serialize};

// =============================================================================
// LIFECYCLE
// =============================================================================

/// Where a workflow is in its life. Closed: a `match` on it covers every
/// state the workflow can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum Lifecycle {
    /// Collecting input at the given stage.
    InProgress(Stage),
    /// The account request has been handed off.
    Submitted,
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifecycle::InProgress(stage) => write!(f, "in progress ({stage})"),
            Lifecycle::Submitted => f.write_str("submitted"),
        }
    }
}

// =============================================================================
// WORKFLOW
// =============================================================================

/// A single registration in progress.
#[derive(Debug, Clone)]
pub struct Workflow {
    stages: StageController,
    store: FieldStore,
    lifecycle: Lifecycle,
}

impl Default for Workflow {
    fn default() -> Self {
        let stages = StageController::new();
        Self {
            lifecycle: Lifecycle::InProgress(stages.current()),
            stages,
            store: FieldStore::default(),
        }
    }
}

impl Workflow {
    /// Start a new registration at the first stage with an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The active stage. Stays at the terminal stage after submission.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stages.current()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.lifecycle(), Lifecycle::Submitted)
    }

    // -------------------------------------------------------------------------
    // Field edits
    // -------------------------------------------------------------------------

    /// Edit a field.
    ///
    /// Only fields of the active stage accept edits: earlier stages are
    /// locked, later ones not yet open. A successful edit always clears the
    /// field's error flag.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), EnrollError> {
        match self.lifecycle {
            Lifecycle::Submitted => Err(EnrollError::AlreadySubmitted),
            Lifecycle::InProgress(_) if self.stages.is_locked(field) => {
                Err(EnrollError::FieldLocked(field))
            }
            Lifecycle::InProgress(_) if !self.stages.is_editable(field) => {
                Err(EnrollError::FieldNotEditable(field))
            }
            Lifecycle::InProgress(_) => {
                self.store.set(field, value);
                Ok(())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// "Send email": leave the identification stage.
    pub fn attempt_advance_from_identification(&mut self) -> Transition {
        match self.lifecycle {
            Lifecycle::Submitted => self.ignored(),
            Lifecycle::InProgress(_) => {
                let outcome = TransitionGate::attempt_advance_from_identification(
                    &mut self.stages,
                    &mut self.store,
                );
                self.record(&outcome);
                outcome
            }
        }
    }

    /// "Verify code": leave the email verification stage.
    pub fn attempt_advance_from_email_verification(&mut self) -> Transition {
        match self.lifecycle {
            Lifecycle::Submitted => self.ignored(),
            Lifecycle::InProgress(_) => {
                let outcome = TransitionGate::attempt_advance_from_email_verification(
                    &mut self.stages,
                    &mut self.store,
                );
                self.record(&outcome);
                outcome
            }
        }
    }

    /// "Register": submit the credentials. Success ends the workflow.
    pub fn attempt_final_submit(&mut self) -> Transition {
        match self.lifecycle {
            Lifecycle::Submitted => self.ignored(),
            Lifecycle::InProgress(_) => {
                let outcome = TransitionGate::attempt_final_submit(&self.stages, &mut self.store);
                self.record(&outcome);
                outcome
            }
        }
    }

    /// Move the lifecycle to follow a gate outcome.
    fn record(&mut self, outcome: &Transition) {
        match outcome {
            Transition::Advanced { to, .. } => self.lifecycle = Lifecycle::InProgress(*to),
            Transition::Submitted { .. } => self.lifecycle = Lifecycle::Submitted,
            Transition::Rejected { .. } | Transition::Ignored { .. } => {}
        }
    }

    fn ignored(&self) -> Transition {
        Transition::Ignored {
            current: self.lifecycle(),
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn draft(&self) -> &RegistrationDraft {
        self.store.draft()
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrorSet {
        self.store.errors()
    }

    /// Policy result currently shown to the user.
    #[must_use]
    pub fn policy(&self) -> &PasswordPolicyResult {
        self.store.policy()
    }

    /// Presentation flags for a field. Nothing is editable once submitted.
    #[must_use]
    pub fn access(&self, field: Field) -> FieldAccess {
        let access = self.stages.access(field);
        match self.lifecycle() {
            Lifecycle::InProgress(_) => access,
            Lifecycle::Submitted => FieldAccess {
                editable: false,
                locked: true,
                ..access
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
