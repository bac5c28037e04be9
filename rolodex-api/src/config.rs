//! API Configuration Module
//!
//! Runtime settings for CORS, uploads, export limits, store selection and
//! the lock sweep. Loaded from environment variables with development
//! defaults.

use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_CORS_ORIGIN, EXPORT_LIMIT, MAX_UPLOAD_BYTES,
};

// ============================================================================
// STORE BACKEND
// ============================================================================

/// Which [`rolodex_storage::ContactStore`] implementation to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, uploads and background maintenance.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Transfer Configuration
    // ========================================================================
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,

    /// Maximum number of records written by a filter-based export.
    pub export_limit: u64,

    // ========================================================================
    // Storage Configuration
    // ========================================================================
    pub store: StoreBackend,

    /// Interval of the expired-lock sweep. `None` disables the job; expired
    /// locks are then simply treated as absent when read.
    pub lock_sweep_interval: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            cors_allow_credentials: true,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            export_limit: EXPORT_LIMIT,
            store: StoreBackend::default(),
            lock_sweep_interval: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ROLODEX_CORS_ORIGINS`: Comma-separated allowed origins, `*` allows all
    ///   (default: http://localhost:3000)
    /// - `ROLODEX_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: true)
    /// - `ROLODEX_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `ROLODEX_MAX_UPLOAD_BYTES`: Upload size limit (default: 50 MiB)
    /// - `ROLODEX_EXPORT_LIMIT`: Filter export cap (default: 10000)
    /// - `ROLODEX_STORE`: "postgres" or "memory" (default: postgres)
    /// - `ROLODEX_LOCK_SWEEP_SECS`: Sweep interval, 0 or unset disables it
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("ROLODEX_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or(defaults.cors_origins);

        let cors_allow_credentials = std::env::var("ROLODEX_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(defaults.cors_allow_credentials);

        let cors_max_age_secs = std::env::var("ROLODEX_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let max_upload_bytes = std::env::var("ROLODEX_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_upload_bytes);

        let export_limit = std::env::var("ROLODEX_EXPORT_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.export_limit);

        let store = match std::env::var("ROLODEX_STORE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to the default store backend");
                defaults.store
            }),
            Err(_) => defaults.store,
        };

        let lock_sweep_interval = std::env::var("ROLODEX_LOCK_SWEEP_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            max_upload_bytes,
            export_limit,
            store,
            lock_sweep_interval,
        }
    }

    /// Whether CORS is restricted to an explicit origin list.
    pub fn is_restricted(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                let host = origin
                    .strip_prefix("https://")
                    .or_else(|| origin.strip_prefix("http://"));
                if let Some(host) = host {
                    return host.ends_with(&format!(".{}", pattern)) || host == pattern;
                }
            }
            false
        })
    }
}

/// `*` (or an empty list) means any origin.
fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if origins.iter().any(|o| o == "*") {
        return Vec::new();
    }
    origins
}
