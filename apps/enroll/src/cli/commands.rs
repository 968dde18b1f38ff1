//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::{
    api::{self, Outcome, PasswordCheckResponse},
    backend::{BackendClient, effect_kind},
    config::AppConfig,
};
use enroll_core::{EnrollError, Field, Transition, Workflow, evaluate, is_valid_email};

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &AppConfig) -> Result<(), EnrollError> {
    println!("Enroll Registration Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", config.server.host);
    println!("  Port:     {}", config.server.port);
    println!(
        "  Backend:  {}",
        config.backend.url.as_deref().unwrap_or("(log only)")
    );
    println!(
        "  Auth:     {}",
        if config.api_key().is_some() {
            "API key"
        } else {
            "disabled"
        }
    );
    println!();
    println!("Endpoints:");
    println!("  GET    /health                             - Health check");
    println!("  POST   /password/check                     - Evaluate a password");
    println!("  POST   /registrations                      - Start a registration");
    println!("  GET    /registrations/{{id}}                 - View a registration");
    println!("  DELETE /registrations/{{id}}                 - Abandon a registration");
    println!("  PUT    /registrations/{{id}}/fields/{{field}}  - Edit a field");
    println!("  POST   /registrations/{{id}}/email           - Send verification email");
    println!("  POST   /registrations/{{id}}/code            - Verify code");
    println!("  POST   /registrations/{{id}}/submit          - Register");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config).await
}

// =============================================================================
// CHECK-PASSWORD COMMAND
// =============================================================================

/// Evaluate a password pair and print the checklist.
pub fn cmd_check_password(password: &str, confirm: Option<&str>, json_mode: bool) -> bool {
    let result = evaluate(password, confirm.unwrap_or(password));
    let response = PasswordCheckResponse::from_result(result);

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_default()
        );
        return response.all_passed;
    }

    println!("Password Policy");
    println!("===============");
    for item in &response.checklist {
        println!("  {}", item);
    }
    println!();
    println!(
        "Result: {}",
        if response.all_passed {
            "acceptable"
        } else {
            "rejected"
        }
    );

    response.all_passed
}

// =============================================================================
// CHECK-EMAIL COMMAND
// =============================================================================

/// Check whether an address has the shape `local@domain.tld`.
pub fn cmd_check_email(address: &str, json_mode: bool) -> bool {
    let valid = is_valid_email(address);

    if json_mode {
        let output = serde_json::json!({
            "address": address,
            "valid": valid,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else if valid {
        println!("{}: valid", address);
    } else {
        println!("{}: malformed", address);
    }

    valid
}

// =============================================================================
// REGISTER COMMAND
// =============================================================================

/// Values for a non-interactive registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub identifier: String,
    pub email: String,
    pub code: String,
    pub password: String,
    pub confirm: String,
}

/// Drive one workflow through every stage.
///
/// Stops at the first rejected transition. Effects are awaited, so a
/// backend failure aborts the command.
pub async fn cmd_register(
    config: &AppConfig,
    input: RegisterInput,
    json_mode: bool,
) -> Result<bool, EnrollError> {
    let backend = BackendClient::new(&config.backend)?;
    let mut workflow = Workflow::new();

    workflow.set_field(Field::Identifier, input.identifier)?;
    workflow.set_field(Field::Email, input.email)?;
    let transition = workflow.attempt_advance_from_identification();
    if !step(&backend, &workflow, &transition, json_mode).await? {
        return Ok(false);
    }

    workflow.set_field(Field::Code, input.code)?;
    let transition = workflow.attempt_advance_from_email_verification();
    if !step(&backend, &workflow, &transition, json_mode).await? {
        return Ok(false);
    }

    workflow.set_field(Field::Password, input.password)?;
    workflow.set_field(Field::ConfirmPassword, input.confirm)?;
    let transition = workflow.attempt_final_submit();
    step(&backend, &workflow, &transition, json_mode).await
}

/// Report one transition and perform its effect. Returns whether the
/// workflow progressed.
async fn step(
    backend: &BackendClient,
    workflow: &Workflow,
    transition: &Transition,
    json_mode: bool,
) -> Result<bool, EnrollError> {
    report(workflow, transition, json_mode);

    if let Some(effect) = transition.effect() {
        tracing::debug!(event = "effect_perform", kind = effect_kind(&effect));
        backend.perform(&effect).await?;
    }
    Ok(transition.is_progress())
}

fn report(workflow: &Workflow, transition: &Transition, json_mode: bool) {
    let outcome = Outcome::of(transition);

    if json_mode {
        let output = serde_json::json!({
            "outcome": outcome,
            "lifecycle": workflow.lifecycle(),
            "failures": transition.failures(),
            "flagged": workflow.errors().flagged(),
        });
        println!("{}", serde_json::to_string(&output).unwrap_or_default());
        return;
    }

    println!("[{:?}] {}", outcome, workflow.lifecycle());
    for failure in transition.failures() {
        println!("  - {}", failure);
    }
    if workflow.policy().should_display_checklist() {
        for item in workflow.policy().checklist() {
            println!("    {}", item);
        }
    }
}
