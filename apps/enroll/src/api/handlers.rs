//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Each handler takes the registry lock, runs one synchronous workflow
//! operation, and releases the lock before any collaborator call is
//! dispatched.

use super::{
    AppState,
    types::{
        ErrorResponse, FieldValueRequest, HealthResponse, Outcome, PasswordCheckRequest,
        PasswordCheckResponse, RegistrationView, TransitionResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use enroll_core::{EnrollError, Field, Transition, Workflow};
use uuid::Uuid;

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP status for a refused operation.
pub fn status_for(error: &EnrollError) -> StatusCode {
    match error {
        EnrollError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        EnrollError::UnknownField(_) => StatusCode::BAD_REQUEST,
        EnrollError::FieldLocked(_)
        | EnrollError::FieldNotEditable(_)
        | EnrollError::AlreadySubmitted => StatusCode::CONFLICT,
        EnrollError::Backend(_) => StatusCode::BAD_GATEWAY,
        EnrollError::Config(_) | EnrollError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: EnrollError) -> Response {
    (status_for(&error), Json(ErrorResponse::new(error.to_string()))).into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// PASSWORD CHECK HANDLER
// =============================================================================

/// Evaluate a password pair without touching any registration.
pub async fn password_check_handler(
    Json(request): Json<PasswordCheckRequest>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(PasswordCheckResponse::from_request(&request)),
    )
}

// =============================================================================
// REGISTRATION LIFECYCLE HANDLERS
// =============================================================================

/// Start a new registration.
pub async fn create_registration_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut registry = state.registrations.write().await;
    let id = registry.start();
    tracing::info!(event = "registration_started", %id, live = registry.len());

    let view = registry
        .get(&id)
        .map(|wf| RegistrationView::from_workflow(id, wf));
    match view {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Get the current view of a registration.
pub async fn get_registration_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let registry = state.registrations.read().await;
    match registry.get(&id) {
        Ok(wf) => (StatusCode::OK, Json(RegistrationView::from_workflow(id, wf))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Abandon a registration, discarding its draft.
pub async fn delete_registration_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let mut registry = state.registrations.write().await;
    match registry.discard(&id) {
        Ok(wf) => {
            tracing::info!(event = "registration_abandoned", %id, stage = ?wf.stage());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(e),
    }
}

// =============================================================================
// FIELD HANDLER
// =============================================================================

/// Edit one field of a registration.
pub async fn set_field_handler(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
    Json(request): Json<FieldValueRequest>,
) -> Response {
    let field: Field = match field.parse() {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let mut registry = state.registrations.write().await;
    let result = registry.get_mut(&id).and_then(|wf| {
        wf.set_field(field, request.value)?;
        Ok(RegistrationView::from_workflow(id, wf))
    });

    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => {
            tracing::debug!(event = "field_edit_refused", %id, %field, error = %e);
            error_response(e)
        }
    }
}

// =============================================================================
// TRANSITION HANDLERS
// =============================================================================

/// "Send email": leave the identification stage.
pub async fn send_email_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    run_transition(&state, id, Workflow::attempt_advance_from_identification).await
}

/// "Verify code": leave the email verification stage.
pub async fn verify_code_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    run_transition(&state, id, Workflow::attempt_advance_from_email_verification).await
}

/// "Register": final submit. A submitted registration is removed.
pub async fn submit_handler(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    run_transition(&state, id, Workflow::attempt_final_submit).await
}

async fn run_transition(
    state: &AppState,
    id: Uuid,
    attempt: fn(&mut Workflow) -> Transition,
) -> Response {
    let (transition, response) = {
        let mut registry = state.registrations.write().await;
        let workflow = match registry.get_mut(&id) {
            Ok(wf) => wf,
            Err(e) => return error_response(e),
        };

        let transition = attempt(workflow);
        let response = TransitionResponse::new(id, &transition, workflow);

        // Submitted drafts are discarded immediately.
        if workflow.is_submitted() {
            if let Err(e) = registry.discard(&id) {
                tracing::warn!(event = "discard_failed", %id, error = %e);
            }
        }
        (transition, response)
    };

    tracing::info!(
        event = "transition",
        %id,
        outcome = ?response.outcome,
        stage = ?response.registration.stage,
        failures = response.failures.len()
    );

    if let Some(effect) = transition.effect() {
        state.backend.dispatch(effect);
    }

    let status = match response.outcome {
        Outcome::Advanced | Outcome::Submitted => StatusCode::OK,
        Outcome::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        Outcome::Ignored => StatusCode::CONFLICT,
    };
    (status, Json(response)).into_response()
}
