//! # Configuration
//!
//! Server settings come from an optional TOML file, then environment
//! variables, then CLI flags (applied by the caller), later sources winning.
//!
//! ## Environment Variables
//!
//! - `ENROLL_API_KEY`: Bearer key required on every endpoint except `/health`
//! - `ENROLL_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*"
//! - `ENROLL_BACKEND_URL`: Base URL of the email/account services
//!
//! ## File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! cors_origins = ["http://localhost:3000"]
//! api_key = "secret"
//! registration_ttl_secs = 1800
//!
//! [backend]
//! url = "http://localhost:9000"
//! timeout_secs = 10
//! ```

use enroll_core::EnrollError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_API_KEY: &str = "ENROLL_API_KEY";
pub const ENV_CORS_ORIGINS: &str = "ENROLL_CORS_ORIGINS";
pub const ENV_BACKEND_URL: &str = "ENROLL_BACKEND_URL";

/// Maximum config file size (64 KiB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

// =============================================================================
// CONFIG STRUCTURES
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` means localhost only; `["*"]` allows every origin.
    pub cors_origins: Option<Vec<String>>,
    pub api_key: Option<String>,
    /// Idle seconds before an untouched registration is dropped; 0 keeps
    /// registrations until they are submitted or deleted.
    pub registration_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: None,
            api_key: None,
            registration_ttl_secs: 30 * 60,
        }
    }
}

/// Collaborator service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// `None` runs the backend client in log-only mode.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, EnrollError> {
        toml::from_str(contents).map_err(|e| EnrollError::Config(e.to_string()))
    }

    /// Read the optional config file and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, EnrollError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    fn from_file(path: &Path) -> Result<Self, EnrollError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            EnrollError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(EnrollError::Config(format!(
                "Config file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            EnrollError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production, a map in tests).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.server.api_key = Some(key);
        }
        if let Some(origins) = lookup(ENV_CORS_ORIGINS) {
            self.server.cors_origins = Some(
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        self
    }

    /// The API key, if authentication is enabled (set and non-empty).
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.server.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Idle lifetime of a registration, `None` when expiry is disabled.
    #[must_use]
    pub fn registration_ttl(&self) -> Option<Duration> {
        match self.server.registration_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
