//! HTTP-side configuration
//!
//! Configuration for CORS, the static frontend and the listen address.
//! Everything is loaded from environment variables with defaults suitable
//! for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

const DEFAULT_CORS_MAX_AGE_SECS: u64 = 24 * 60 * 60;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS and static file serving.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,

    /// Seconds a browser may cache a preflight answer.
    pub cors_max_age_secs: u64,

    /// Directory holding the frontend. When set, `/static/*` serves files
    /// from it and `/` serves its `index.html`.
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            static_dir: None,
        }
    }
}

impl ApiConfig {
    /// Read from the environment, falling back to [`Default`].
    ///
    /// Environment variables:
    /// - `SORTBOX_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `SORTBOX_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `SORTBOX_STATIC_DIR`: Frontend directory (default: none)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("SORTBOX_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("SORTBOX_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let static_dir = std::env::var("SORTBOX_STATIC_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Self {
            cors_origins,
            cors_max_age_secs,
            static_dir,
        }
    }

    /// Whether CORS is restricted to `cors_origins`.
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == origin)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

// ============================================================================
// LISTEN ADDRESS
// ============================================================================

/// Resolve the listen address from `SORTBOX_API_BIND` and `PORT` /
/// `SORTBOX_API_PORT`.
pub fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("SORTBOX_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("SORTBOX_API_PORT").ok())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    parse_bind_addr(&host, &port)
}

fn parse_bind_addr(host: &str, port_str: &str) -> ApiResult<SocketAddr> {
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
