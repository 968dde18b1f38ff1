//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! Password values are accepted on input but never echoed: a view only
//! reports whether each password field is set.

use enroll_core::{
    ChecklistItem, Field, Lifecycle, PasswordPolicyResult, Stage, Transition, ValidationFailure,
    Workflow, evaluate,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx response produced by a handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =============================================================================
// PASSWORD CHECK
// =============================================================================

/// Stateless password policy check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordCheckRequest {
    pub password: String,
    /// Defaults to `password` when omitted.
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

/// Policy evaluation result with its rendered checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordCheckResponse {
    pub policy: PasswordPolicyResult,
    pub all_passed: bool,
    pub checklist: Vec<ChecklistItem>,
}

impl PasswordCheckResponse {
    pub fn from_request(request: &PasswordCheckRequest) -> Self {
        let confirm = request
            .confirm_password
            .as_deref()
            .unwrap_or(&request.password);
        Self::from_result(evaluate(&request.password, confirm))
    }

    pub fn from_result(policy: PasswordPolicyResult) -> Self {
        Self {
            all_passed: policy.all_passed(),
            checklist: policy.checklist(),
            policy,
        }
    }
}

// =============================================================================
// FIELD EDIT
// =============================================================================

/// Field edit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldValueRequest {
    pub value: String,
}

// =============================================================================
// REGISTRATION VIEW
// =============================================================================

/// Presentation state of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldView {
    pub name: Field,
    /// `None` for password fields.
    pub value: Option<String>,
    pub is_set: bool,
    pub error: bool,
    pub editable: bool,
    pub locked: bool,
    pub visible: bool,
}

/// Everything a front-end needs to render a registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationView {
    pub id: Uuid,
    pub lifecycle: Lifecycle,
    pub stage: Stage,
    pub stage_number: u8,
    pub stage_name: String,
    pub fields: Vec<FieldView>,
    pub policy: PasswordPolicyResult,
    pub show_checklist: bool,
    pub checklist: Vec<ChecklistItem>,
}

impl RegistrationView {
    pub fn from_workflow(id: Uuid, workflow: &Workflow) -> Self {
        let draft = workflow.draft();
        let errors = workflow.errors();

        let fields = Field::ALL
            .into_iter()
            .map(|field| {
                let raw = draft.get(field);
                let access = workflow.access(field);
                FieldView {
                    name: field,
                    value: (!field.is_secret()).then(|| raw.to_string()),
                    is_set: !raw.is_empty(),
                    error: errors.get(field),
                    editable: access.editable,
                    locked: access.locked,
                    visible: access.visible,
                }
            })
            .collect();

        let policy = *workflow.policy();
        let stage = workflow.stage();

        Self {
            id,
            lifecycle: workflow.lifecycle(),
            stage,
            stage_number: stage.number(),
            stage_name: stage.name().to_string(),
            fields,
            policy,
            show_checklist: policy.should_display_checklist(),
            checklist: policy.checklist(),
        }
    }

    /// Look up one field's view.
    pub fn field(&self, name: Field) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// TRANSITION RESPONSE
// =============================================================================

/// Outcome kind of a transition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Advanced,
    Rejected,
    Submitted,
    Ignored,
}

impl Outcome {
    pub fn of(transition: &Transition) -> Self {
        match transition {
            Transition::Advanced { .. } => Outcome::Advanced,
            Transition::Rejected { .. } => Outcome::Rejected,
            Transition::Submitted { .. } => Outcome::Submitted,
            Transition::Ignored { .. } => Outcome::Ignored,
        }
    }
}

/// Response to `POST /registrations/{id}/email|code|submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub outcome: Outcome,
    pub failures: Vec<ValidationFailure>,
    pub registration: RegistrationView,
}

impl TransitionResponse {
    pub fn new(id: Uuid, transition: &Transition, workflow: &Workflow) -> Self {
        Self {
            outcome: Outcome::of(transition),
            failures: transition.failures().to_vec(),
            registration: RegistrationView::from_workflow(id, workflow),
        }
    }
}
