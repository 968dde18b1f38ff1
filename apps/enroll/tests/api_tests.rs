//! Integration tests for the Enroll HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use enroll::api::{
    AppState, ErrorResponse, HealthResponse, Outcome, PasswordCheckResponse, RegistrationView,
    TransitionResponse, create_router,
};
use enroll::config::AppConfig;
use enroll_core::{Field, Lifecycle, PolicyRule, Stage, ValidationFailure};
use serde_json::json;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a test server with default configuration (no auth, log-only backend).
fn create_test_server() -> TestServer {
    let state = AppState::new(&AppConfig::default()).unwrap();
    TestServer::new(create_router(state)).unwrap()
}

/// Create a test server with authentication enabled.
fn create_auth_test_server(api_key: &str) -> TestServer {
    let mut config = AppConfig::default();
    config.server.api_key = Some(api_key.to_string());
    let state = AppState::new(&config).unwrap();
    TestServer::new(create_router(state)).unwrap()
}

async fn start(server: &TestServer) -> RegistrationView {
    let response = server.post("/registrations").await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn put_field(server: &TestServer, view: &RegistrationView, field: &str, value: &str) {
    server
        .put(&format!("/registrations/{}/fields/{}", view.id, field))
        .json(&json!({ "value": value }))
        .await
        .assert_status_ok();
}

async fn transition(server: &TestServer, view: &RegistrationView, action: &str) -> TransitionResponse {
    server
        .post(&format!("/registrations/{}/{}", view.id, action))
        .await
        .json()
}

/// Registration that has reached credential creation.
async fn at_credentials(server: &TestServer) -> RegistrationView {
    let view = start(server).await;
    put_field(server, &view, "identifier", "oracle").await;
    put_field(server, &view, "email", "a@b.com").await;
    assert_eq!(transition(server, &view, "email").await.outcome, Outcome::Advanced);
    put_field(server, &view, "code", "123456").await;
    assert_eq!(transition(server, &view, "code").await.outcome, Outcome::Advanced);
    view
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// PASSWORD CHECK TESTS
// =============================================================================

#[tokio::test]
async fn test_password_check_passing() {
    let server = create_test_server();

    let response = server
        .post("/password/check")
        .json(&json!({ "password": "abc12345" }))
        .await;

    response.assert_status_ok();
    let check: PasswordCheckResponse = response.json();
    assert!(check.all_passed);
    assert_eq!(check.checklist.len(), 3);
}

#[tokio::test]
async fn test_password_check_mismatch() {
    let server = create_test_server();

    let response = server
        .post("/password/check")
        .json(&json!({ "password": "password1", "confirmPassword": "password2" }))
        .await;

    let check: PasswordCheckResponse = response.json();
    assert!(!check.all_passed);
    assert!(!check.policy.passwords_match);
    assert!(check.policy.length);
    assert_eq!(check.checklist[2].label, "Passwords do not match");
}

// =============================================================================
// REGISTRATION LIFECYCLE TESTS
// =============================================================================

#[tokio::test]
async fn test_new_registration_view() {
    let server = create_test_server();

    let view = start(&server).await;

    assert_eq!(view.lifecycle, Lifecycle::InProgress(Stage::Identification));
    assert_eq!(view.stage_number, 1);
    assert!(!view.show_checklist);

    let email = view.field(Field::Email).unwrap();
    assert!(email.editable && email.visible && !email.locked);
    let code = view.field(Field::Code).unwrap();
    assert!(!code.visible && !code.editable);
}

#[tokio::test]
async fn test_get_and_delete_registration() {
    let server = create_test_server();
    let view = start(&server).await;
    let path = format!("/registrations/{}", view.id);

    server.get(&path).await.assert_status_ok();
    server
        .delete(&path)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server.get(&path).await.assert_status_not_found();
}

#[tokio::test]
async fn test_unknown_registration_not_found() {
    let server = create_test_server();

    let response = server
        .get("/registrations/00000000-0000-4000-8000-000000000000")
        .await;

    response.assert_status_not_found();
    let error: ErrorResponse = response.json();
    assert!(error.error.contains("00000000-0000-4000-8000-000000000000"));
}

// =============================================================================
// FIELD EDIT TESTS
// =============================================================================

#[tokio::test]
async fn test_unknown_field_bad_request() {
    let server = create_test_server();
    let view = start(&server).await;

    let response = server
        .put(&format!("/registrations/{}/fields/nickname", view.id))
        .json(&json!({ "value": "x" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_field_alias_accepted() {
    let server = create_test_server();
    let view = start(&server).await;

    put_field(&server, &view, "userId", "oracle").await;

    let view: RegistrationView = server
        .get(&format!("/registrations/{}", view.id))
        .await
        .json();
    assert_eq!(
        view.field(Field::Identifier).unwrap().value.as_deref(),
        Some("oracle")
    );
}

#[tokio::test]
async fn test_future_field_conflict() {
    let server = create_test_server();
    let view = start(&server).await;

    let response = server
        .put(&format!("/registrations/{}/fields/password", view.id))
        .json(&json!({ "value": "abc12345" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_locked_field_conflict() {
    let server = create_test_server();
    let view = at_credentials(&server).await;

    let response = server
        .put(&format!("/registrations/{}/fields/email", view.id))
        .json(&json!({ "value": "c@d.com" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

// =============================================================================
// TRANSITION TESTS
// =============================================================================

#[tokio::test]
async fn test_malformed_email_rejected() {
    let server = create_test_server();
    let view = start(&server).await;
    put_field(&server, &view, "email", "not-an-email").await;

    let response = server
        .post(&format!("/registrations/{}/email", view.id))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let result: TransitionResponse = response.json();
    assert_eq!(result.outcome, Outcome::Rejected);
    assert_eq!(
        result.failures,
        vec![ValidationFailure::MalformedValue {
            field: Field::Email
        }]
    );
    assert!(result.registration.field(Field::Email).unwrap().error);
    assert_eq!(result.registration.stage, Stage::Identification);
}

#[tokio::test]
async fn test_edit_clears_error_flag() {
    let server = create_test_server();
    let view = start(&server).await;
    transition(&server, &view, "email").await;

    put_field(&server, &view, "email", "a@b.com").await;

    let view: RegistrationView = server
        .get(&format!("/registrations/{}", view.id))
        .await
        .json();
    assert!(!view.field(Field::Email).unwrap().error);
}

#[tokio::test]
async fn test_repeated_advance_ignored() {
    let server = create_test_server();
    let view = at_credentials(&server).await;

    let response = server
        .post(&format!("/registrations/{}/email", view.id))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let result: TransitionResponse = response.json();
    assert_eq!(result.outcome, Outcome::Ignored);
    assert_eq!(result.registration.stage, Stage::CredentialCreation);
}

#[tokio::test]
async fn test_weak_password_shows_checklist() {
    let server = create_test_server();
    let view = at_credentials(&server).await;
    put_field(&server, &view, "password", "abc").await;
    put_field(&server, &view, "confirm_password", "abc").await;

    let response = server
        .post(&format!("/registrations/{}/submit", view.id))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let result: TransitionResponse = response.json();
    assert!(result.failures.contains(&ValidationFailure::PolicyViolation {
        rule: PolicyRule::Length
    }));
    assert!(result.registration.show_checklist);
    assert!(!result.registration.policy.length);
    assert_eq!(result.registration.stage, Stage::CredentialCreation);
}

#[tokio::test]
async fn test_full_registration_discards_draft() {
    let server = create_test_server();
    let view = at_credentials(&server).await;
    put_field(&server, &view, "password", "abc12345").await;
    put_field(&server, &view, "confirmPassword", "abc12345").await;

    let response = server
        .post(&format!("/registrations/{}/submit", view.id))
        .await;

    response.assert_status_ok();
    let result: TransitionResponse = response.json();
    assert_eq!(result.outcome, Outcome::Submitted);
    assert_eq!(result.registration.lifecycle, Lifecycle::Submitted);

    let password = result.registration.field(Field::Password).unwrap();
    assert!(password.value.is_none());
    assert!(password.is_set);

    server
        .get(&format!("/registrations/{}", view.id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_password_never_echoed() {
    let server = create_test_server();
    let view = at_credentials(&server).await;
    put_field(&server, &view, "password", "hunter2hunter2").await;

    let body = server
        .get(&format!("/registrations/{}", view.id))
        .await
        .text();

    assert!(!body.contains("hunter2hunter2"));
}

// =============================================================================
// ERROR HANDLING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();

    server.get("/unknown").await.assert_status_not_found();
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = create_test_server();

    // /health is GET only
    let response = server.post("/health").await;
    assert_eq!(response.status_code().as_u16(), 405);
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = create_test_server();

    let response = server
        .post("/password/check")
        .text("not valid json")
        .content_type("application/json")
        .await;

    assert!(response.status_code().is_client_error());
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .post("/registrations")
        .add_header(
            header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_auth_valid_raw_token() {
    let api_key = "test-raw-key-67890";
    let server = create_auth_test_server(api_key);

    let response = server
        .post("/registrations")
        .add_header(header::AUTHORIZATION, api_key.parse::<HeaderValue>().unwrap())
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let server = create_auth_test_server("correct-key");

    let response = server
        .post("/registrations")
        .add_header(
            header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let server = create_auth_test_server("correct-key");

    server
        .post("/password/check")
        .json(&json!({ "password": "x" }))
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_auth_health_always_allowed() {
    let server = create_auth_test_server("correct-key");

    server.get("/health").await.assert_status_ok();
}
