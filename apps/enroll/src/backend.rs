//! # Backend Client
//!
//! HTTP client for the collaborator services a registration hands off to:
//!
//! - `POST {base}/email/verification` - deliver a verification code
//! - `POST {base}/accounts` - create the account
//!
//! Without a base URL the client runs in log-only mode: effects are
//! recorded with `tracing` and reported as delivered.

use crate::config::BackendConfig;
use enroll_core::{AccountRequest, Effect, EnrollError};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors from the backend client layer.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Cannot reach the backend.
    #[error("Cannot connect to backend at {0}")]
    ConnectionFailed(String),
    /// The backend refused the request (4xx).
    #[error("Backend rejected request ({0}): {1}")]
    Rejected(u16, String),
    /// The backend failed (5xx).
    #[error("Backend error ({0}): {1}")]
    ServerError(u16, String),
}

impl From<BackendError> for EnrollError {
    fn from(e: BackendError) -> Self {
        EnrollError::Backend(e.to_string())
    }
}

/// Client for the email-dispatch and account-creation services.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl BackendClient {
    /// Build a client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, EnrollError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EnrollError::Config(format!("HTTP client: {}", e)))?;

        let base_url = config
            .url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        Ok(Self { http, base_url })
    }

    /// True when no backend URL is configured.
    #[must_use]
    pub fn is_log_only(&self) -> bool {
        self.base_url.is_none()
    }

    /// Ask the dispatch service to send a verification code.
    pub async fn send_verification_email(&self, email: &str) -> Result<(), BackendError> {
        self.post("/email/verification", json!({ "email": email }))
            .await
    }

    /// Ask the account service to create the account.
    pub async fn create_account(&self, request: &AccountRequest) -> Result<(), BackendError> {
        self.post("/accounts", json!(request)).await
    }

    /// Perform an effect and wait for the outcome.
    pub async fn perform(&self, effect: &Effect) -> Result<(), BackendError> {
        match effect {
            Effect::DispatchVerificationEmail { email } => {
                self.send_verification_email(email).await
            }
            Effect::CreateAccount(request) => self.create_account(request).await,
        }
    }

    /// Perform an effect in the background. The outcome is logged and
    /// never reported back to the workflow.
    pub fn dispatch(&self, effect: Effect) {
        let client = self.clone();
        tokio::spawn(async move {
            let kind = effect_kind(&effect);
            match client.perform(&effect).await {
                Ok(()) => tracing::info!(event = "effect_delivered", kind, "Backend call succeeded"),
                Err(e) => tracing::warn!(
                    event = "effect_failed",
                    kind,
                    error = %e,
                    "Backend call failed"
                ),
            }
        });
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), BackendError> {
        let Some(base) = self.base_url.as_deref() else {
            tracing::info!(
                event = "effect_logged",
                path,
                "No backend configured; skipping call"
            );
            return Ok(());
        };

        let url = format!("{}{}", base, path);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::ConnectionFailed(format!("{}: {e}", base)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let text = resp.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(BackendError::Rejected(status.as_u16(), text))
        } else {
            Err(BackendError::ServerError(status.as_u16(), text))
        }
    }
}

/// Short label for logs. Never includes field values.
#[must_use]
pub fn effect_kind(effect: &Effect) -> &'static str {
    match effect {
        Effect::DispatchVerificationEmail { .. } => "dispatch_verification_email",
        Effect::CreateAccount(_) => "create_account",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_means_log_only() {
        let client = BackendClient::new(&BackendConfig::default()).expect("client");
        assert!(client.is_log_only());
    }

    #[test]
    fn blank_url_means_log_only() {
        let config = BackendConfig {
            url: Some(String::new()),
            timeout_secs: 1,
        };
        assert!(BackendClient::new(&config).expect("client").is_log_only());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = BackendConfig {
            url: Some("http://svc.test/".to_string()),
            timeout_secs: 1,
        };
        let client = BackendClient::new(&config).expect("client");
        assert_eq!(client.base_url.as_deref(), Some("http://svc.test"));
    }

    #[tokio::test]
    async fn log_only_perform_succeeds() {
        let client = BackendClient::new(&BackendConfig::default()).expect("client");
        let effect = Effect::DispatchVerificationEmail {
            email: "a@b.com".to_string(),
        };
        assert!(client.perform(&effect).await.is_ok());
    }

    // -------------------------------------------------------------------------
    // Against a live HTTP stub
    // -------------------------------------------------------------------------

    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(&'static str, Value)>>>;

    /// Serve `/email/verification` (always 202) and `/accounts` (answering
    /// with `account_status` and body "taken") on an ephemeral port.
    async fn spawn_stub(account_status: StatusCode) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let email_log = Arc::clone(&captured);
        let account_log = Arc::clone(&captured);

        let app = Router::new()
            .route(
                "/email/verification",
                post(move |Json(body): Json<Value>| {
                    let log = Arc::clone(&email_log);
                    async move {
                        log.lock().expect("lock").push(("/email/verification", body));
                        StatusCode::ACCEPTED
                    }
                }),
            )
            .route(
                "/accounts",
                post(move |Json(body): Json<Value>| {
                    let log = Arc::clone(&account_log);
                    async move {
                        log.lock().expect("lock").push(("/accounts", body));
                        (account_status, "taken")
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        // Trailing slash on purpose: the client must not produce `//accounts`.
        (format!("http://{}/", addr), captured)
    }

    fn client_for(url: String) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Some(url),
            timeout_secs: 5,
        })
        .expect("client")
    }

    fn account() -> AccountRequest {
        AccountRequest {
            identifier: "oracle".to_string(),
            email: "a@b.com".to_string(),
            password: "abc12345".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_expected_bodies() {
        let (url, captured) = spawn_stub(StatusCode::CREATED).await;
        let client = client_for(url);
        assert!(!client.is_log_only());

        client
            .perform(&Effect::DispatchVerificationEmail {
                email: "a@b.com".to_string(),
            })
            .await
            .expect("email dispatch");
        client
            .perform(&Effect::CreateAccount(account()))
            .await
            .expect("account creation");

        let calls = captured.lock().expect("lock").clone();
        assert_eq!(
            calls,
            vec![
                ("/email/verification", json!({ "email": "a@b.com" })),
                (
                    "/accounts",
                    json!({
                        "identifier": "oracle",
                        "email": "a@b.com",
                        "password": "abc12345"
                    })
                ),
            ]
        );
    }

    #[tokio::test]
    async fn client_error_is_rejected() {
        let (url, _captured) = spawn_stub(StatusCode::CONFLICT).await;

        let result = client_for(url).create_account(&account()).await;

        match result {
            Err(BackendError::Rejected(409, body)) => assert_eq!(body, "taken"),
            other => panic!("expected Rejected(409), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let (url, _captured) = spawn_stub(StatusCode::SERVICE_UNAVAILABLE).await;

        let result = client_for(url).create_account(&account()).await;

        assert!(matches!(result, Err(BackendError::ServerError(503, _))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_connection_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let result = client_for(format!("http://{}", addr))
            .send_verification_email("a@b.com")
            .await;

        assert!(matches!(result, Err(BackendError::ConnectionFailed(_))));
    }

    #[test]
    fn effect_kind_labels() {
        let effect = Effect::DispatchVerificationEmail {
            email: "a@b.com".to_string(),
        };
        assert_eq!(effect_kind(&effect), "dispatch_verification_email");
    }
}
