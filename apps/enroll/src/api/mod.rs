//! # Enroll HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /password/check` - Evaluate a password pair
//! - `POST /registrations` - Start a registration
//! - `GET /registrations/{id}` - Current view of a registration
//! - `DELETE /registrations/{id}` - Abandon a registration
//! - `PUT /registrations/{id}/fields/{field}` - Edit a field
//! - `POST /registrations/{id}/email` - Leave the identification stage
//! - `POST /registrations/{id}/code` - Leave the email verification stage
//! - `POST /registrations/{id}/submit` - Final submit
//!
//! Security settings (CORS origins, API key) come from [`AppConfig`].

mod auth;
mod handlers;
mod types;

pub use auth::keys_match;
pub use handlers::status_for;
pub use types::{
    ErrorResponse, FieldValueRequest, FieldView, HealthResponse, Outcome, PasswordCheckRequest,
    PasswordCheckResponse, RegistrationView, TransitionResponse,
};

use crate::{backend::BackendClient, config::AppConfig, registry::Registry};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use enroll_core::EnrollError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are tiny; anything larger is refused.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Upper bound on how often idle registrations are swept.
const SWEEP_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// Live registrations.
    pub registrations: Arc<RwLock<Registry>>,
    /// Collaborator client effects are dispatched through.
    pub backend: BackendClient,
    /// Bearer key; `None` disables authentication.
    pub api_key: Option<Arc<str>>,
    cors_origins: Option<Vec<String>>,
}

impl AppState {
    /// Build state from configuration.
    pub fn new(config: &AppConfig) -> Result<Self, EnrollError> {
        Ok(Self {
            registrations: Arc::new(RwLock::new(Registry::with_ttl(config.registration_ttl()))),
            backend: BackendClient::new(&config.backend)?,
            api_key: config.api_key().map(Arc::from),
            cors_origins: config.server.cors_origins.clone(),
        })
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from configured origins.
///
/// - `["*"]`: allows all origins
/// - `None`: localhost only
/// - otherwise: the listed origins; falls back to localhost if none parse
fn build_cors_layer(origins: Option<&[String]>) -> CorsLayer {
    match origins {
        Some([only]) if only == "*" => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", s);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", s, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                restricted_cors(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse().ok())
    .collect();
    restricted_cors(origins)
}

fn restricted_cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit,
/// authentication.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(state.cors_origins.as_deref());

    if state.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set ENROLL_API_KEY to enable authentication."
        );
    }

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/password/check", post(handlers::password_check_handler))
        .route(
            "/registrations",
            post(handlers::create_registration_handler),
        )
        .route(
            "/registrations/{id}",
            get(handlers::get_registration_handler).delete(handlers::delete_registration_handler),
        )
        .route(
            "/registrations/{id}/fields/{field}",
            put(handlers::set_field_handler),
        )
        .route("/registrations/{id}/email", post(handlers::send_email_handler))
        .route("/registrations/{id}/code", post(handlers::verify_code_handler))
        .route("/registrations/{id}/submit", post(handlers::submit_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::api_key_auth_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(config: &AppConfig) -> Result<(), EnrollError> {
    let state = AppState::new(config)?;
    if state.backend.is_log_only() {
        tracing::warn!("No backend URL configured; effects will only be logged");
    }
    spawn_expiry_sweep(&state);
    let router = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| EnrollError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Enroll HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| EnrollError::Io(format!("Server error: {}", e)))
}

/// Sweep idle registrations in the background, so an idle server still
/// releases them.
fn spawn_expiry_sweep(state: &AppState) {
    let registrations = Arc::clone(&state.registrations);
    tokio::spawn(async move {
        let Some(ttl) = registrations.read().await.ttl() else {
            return;
        };
        let mut interval = tokio::time::interval(ttl.min(SWEEP_PERIOD));
        loop {
            interval.tick().await;
            let expired = registrations
                .write()
                .await
                .expire_idle(std::time::Instant::now());
            if expired > 0 {
                tracing::info!(event = "registrations_expired", count = expired);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
