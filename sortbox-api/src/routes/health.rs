//! Health Probes
//!
//! - `/health/ping`: plain-text `pong`
//! - `/health/live`: the process answers
//! - `/health/ready`: the array store answers; 503 otherwise

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use sortbox_storage::ArrayStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// TYPES
// ============================================================================

/// Body of `/health/live` and `/health/ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

impl HealthResponse {
    fn alive() -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: Some("SORTBOX is running".to_string()),
            details: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn http_status(self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Readiness details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthDetails {
    pub store: ComponentHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Outcome of probing the array store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// Round trip of the ping plus the row count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Arrays currently stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrays: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn ArrayStore>,
    pub started: Instant,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Always `pong`", body = String),
    ),
)]
pub async fn ping() -> &'static str {
    "pong"
}

/// GET /health/live
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "The process answers", body = HealthResponse),
    ),
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse::alive())
}

/// GET /health/ready
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse),
    ),
)]
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let store = probe_store(state.store.as_ref()).await;
    let status = store.status;

    let body = HealthResponse {
        status,
        message: None,
        details: Some(HealthDetails {
            store,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started.elapsed().as_secs(),
        }),
    };

    (status.http_status(), Json(body))
}

/// Whole milliseconds, pinned at `u64::MAX`.
fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

async fn probe_store(store: &dyn ArrayStore) -> ComponentHealth {
    let start = Instant::now();
    let probed = match store.ping().await {
        Ok(()) => store.count().await,
        Err(e) => Err(e),
    };

    match probed {
        Ok(arrays) => ComponentHealth {
            status: HealthStatus::Healthy,
            latency_ms: Some(saturating_millis(start.elapsed())),
            arrays: Some(arrays),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Store probe failed");
            ComponentHealth {
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                arrays: None,
                error: Some(e.to_string()),
            }
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Router mounted under `/health`.
pub fn create_router(store: Arc<dyn ArrayStore>) -> Router {
    let state = Arc::new(HealthState {
        store,
        started: Instant::now(),
    });

    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortbox_core::SortboxResult;
    use sortbox_storage::InMemoryArrayStore;

    #[test]
    fn test_liveness_body_omits_details() -> Result<(), serde_json::Error> {
        let json = serde_json::to_value(HealthResponse::alive())?;
        assert_eq!(json["status"], "healthy");
        assert!(json.get("details").is_none());
        Ok(())
    }

    #[test]
    fn test_unhealthy_is_503() {
        assert_eq!(HealthStatus::Unhealthy.http_status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(HealthStatus::Healthy.http_status(), StatusCode::OK);
    }

    #[test]
    fn test_latency_saturates() {
        assert_eq!(saturating_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(saturating_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_probe_counts_arrays() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        store.insert(&[2, 1], false).await?;
        store.insert(&[5], true).await?;

        let health = probe_store(&store).await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.arrays, Some(2));
        assert!(health.error.is_none());
        Ok(())
    }
}
