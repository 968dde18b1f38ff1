//! # Stage Controller
//!
//! ## Stage Definitions
//!
//! | Stage | Name | Owned fields | Leaves on |
//! |-------|------|--------------|-----------|
//! | 1 | Identification | identifier, email | valid email |
//! | 2 | EmailVerification | code | non-empty code |
//! | 3 | CredentialCreation | password, confirm_password | final submit |
//!
//! Stages only move forward. Once a stage is left, its fields stay visible
//! but locked, so the user can see what they already committed.

use crate::Field;
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Registration stages, totally ordered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Stage 1: identifier and email capture.
    #[default]
    Identification,
    /// Stage 2: verification code confirmation.
    EmailVerification,
    /// Stage 3: password creation.
    CredentialCreation,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Stage; 3] = [
        Stage::Identification,
        Stage::EmailVerification,
        Stage::CredentialCreation,
    ];

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Identification => "Identifier & Email",
            Stage::EmailVerification => "Email Verification",
            Stage::CredentialCreation => "Credential Creation",
        }
    }

    /// One-based position, as shown to users ("step 2 of 3").
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Stage::Identification => 1,
            Stage::EmailVerification => 2,
            Stage::CredentialCreation => 3,
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Identification => Some(Stage::EmailVerification),
            Stage::EmailVerification => Some(Stage::CredentialCreation),
            Stage::CredentialCreation => None,
        }
    }

    /// Check if this stage is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::CredentialCreation)
    }

    /// The stage a field is captured in.
    #[must_use]
    pub fn owning(field: Field) -> Stage {
        match field {
            Field::Identifier | Field::Email => Stage::Identification,
            Field::Code => Stage::EmailVerification,
            Field::Password | Field::ConfirmPassword => Stage::CredentialCreation,
        }
    }

    /// Fields captured in this stage.
    #[must_use]
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Stage::Identification => &[Field::Identifier, Field::Email],
            Stage::EmailVerification => &[Field::Code],
            Stage::CredentialCreation => &[Field::Password, Field::ConfirmPassword],
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self, self.name())
    }
}

// =============================================================================
// FIELD ACCESS
// =============================================================================

/// How a field should be presented at the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    /// Field accepts edits.
    pub editable: bool,
    /// Field's stage is complete; shown read-only.
    pub locked: bool,
    /// Field's stage has been reached.
    pub visible: bool,
}

// =============================================================================
// STAGE CONTROLLER
// =============================================================================

/// Tracks the active stage. Forward-only: there is no `retreat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageController {
    current: Stage,
}

impl StageController {
    /// Start at the first stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active stage.
    #[must_use]
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Move to the next stage.
    ///
    /// Returns the new stage, or `None` (and changes nothing) when already
    /// at the terminal stage.
    pub fn advance(&mut self) -> Option<Stage> {
        if self.current.is_terminal() {
            return None;
        }
        let next = self.current.next()?;
        self.current = next;
        Some(next)
    }

    /// Check if a specific stage is reached.
    #[must_use]
    pub fn has_reached(&self, target: Stage) -> bool {
        self.current >= target
    }

    /// A field is editable only while its own stage is active.
    #[must_use]
    pub fn is_editable(&self, field: Field) -> bool {
        Stage::owning(field) == self.current
    }

    /// A field is locked once the controller has moved past its stage.
    #[must_use]
    pub fn is_locked(&self, field: Field) -> bool {
        Stage::owning(field) < self.current
    }

    /// A field is visible once its stage has been reached.
    #[must_use]
    pub fn is_visible(&self, field: Field) -> bool {
        self.has_reached(Stage::owning(field))
    }

    /// Presentation flags for a field.
    #[must_use]
    pub fn access(&self, field: Field) -> FieldAccess {
        FieldAccess {
            editable: self.is_editable(field),
            locked: self.is_locked(field),
            visible: self.is_visible(field),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_ordering() {
        assert!(Stage::Identification < Stage::EmailVerification);
        assert!(Stage::EmailVerification < Stage::CredentialCreation);
    }

    #[test]
    fn every_field_has_exactly_one_owner() {
        for field in Field::ALL {
            let owners = Stage::ALL
                .iter()
                .filter(|s| s.fields().contains(&field))
                .count();
            assert_eq!(owners, 1, "{field}");
            assert!(Stage::owning(field).fields().contains(&field));
        }
    }

    #[test]
    fn advance_walks_forward_then_stops() {
        let mut controller = StageController::new();
        assert_eq!(controller.current(), Stage::Identification);

        assert_eq!(controller.advance(), Some(Stage::EmailVerification));
        assert_eq!(controller.advance(), Some(Stage::CredentialCreation));
        assert_eq!(controller.advance(), None);
        assert_eq!(controller.current(), Stage::CredentialCreation);
    }

    #[test]
    fn only_credential_creation_is_terminal() {
        for stage in Stage::ALL {
            assert_eq!(stage.is_terminal(), stage.next().is_none(), "{stage}");
        }
        assert!(Stage::CredentialCreation.is_terminal());
    }

    #[test]
    fn completed_stage_fields_are_locked() {
        let mut controller = StageController::new();
        assert!(controller.is_editable(Field::Email));
        assert!(!controller.is_locked(Field::Email));

        controller.advance();

        assert!(!controller.is_editable(Field::Email));
        assert!(controller.is_locked(Field::Identifier));
        assert!(controller.is_editable(Field::Code));
    }

    #[test]
    fn future_stage_fields_are_hidden() {
        let controller = StageController::new();
        let access = controller.access(Field::Password);

        assert_eq!(
            access,
            FieldAccess {
                editable: false,
                locked: false,
                visible: false,
            }
        );
        assert!(controller.is_visible(Field::Identifier));
    }

    #[test]
    fn password_fields_never_lock() {
        let mut controller = StageController::new();
        controller.advance();
        controller.advance();
        controller.advance();

        assert!(controller.is_editable(Field::Password));
        assert!(controller.is_editable(Field::ConfirmPassword));
        assert!(!controller.is_locked(Field::ConfirmPassword));
    }

    #[test]
    fn stage_display() {
        assert_eq!(
            format!("{}", Stage::Identification),
            "Identification: Identifier & Email"
        );
        assert_eq!(Stage::CredentialCreation.number(), 3);
    }
}
