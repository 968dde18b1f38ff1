//! # enroll-core
//!
//! The registration workflow engine for Enroll - THE LOGIC.
//!
//! A signup runs through three stages:
//!
//! ```text
//! Identification --(valid email)--> EmailVerification --(non-empty code)-->
//!     CredentialCreation --(all checks pass)--> [submitted]
//! ```
//!
//! ## Components
//!
//! - `system` - stage controller: current stage, field locking
//! - `store` - field store: draft values, error flags, published policy
//! - `policy` - password policy validator (pure)
//! - `gate` - transition gate: advance / submit decisions
//! - `workflow` - one session tying the above together
//!
//! ## Architectural Constraints
//!
//! - Single owner: every mutation goes through `&mut self`
//! - No async, no network, no logging (pure Rust)
//! - Collaborator calls are returned as `Effect` values for the host to run
//! - Validation failures are values on the outcome, never errors

// =============================================================================
// MODULES
// =============================================================================

pub mod gate;
pub mod policy;
pub mod store;
pub mod system;
pub mod types;
pub mod validation;
pub mod workflow;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{EnrollError, Field, FieldErrorSet, RegistrationDraft};

// =============================================================================
// RE-EXPORTS: Workflow Engine
// =============================================================================

pub use gate::{AccountRequest, Effect, Transition, TransitionGate, ValidationFailure};
pub use policy::{
    ChecklistItem, MIN_PASSWORD_LENGTH, PasswordPolicyResult, PolicyRule, evaluate,
};
pub use store::FieldStore;
pub use validation::{is_missing, is_valid_email, passwords_match};
pub use workflow::{Lifecycle, Workflow};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{FieldAccess, Stage, StageController};
