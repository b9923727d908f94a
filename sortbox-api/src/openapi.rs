//! OpenAPI Specification for SORTBOX API
//!
//! Generated by utoipa from the route annotations and the request/response
//! types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{arrays, health};
use crate::telemetry::metrics;
use crate::types::*;

use sortbox_core::{ArrayRecord, IdRemap};

/// OpenAPI document for SORTBOX API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SORTBOX API",
        version = "0.1.0",
        description = "Stores integer arrays, sorts them with selection sort and keeps ids contiguous",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    tags(
        (name = "Arrays", description = "Array storage, sorting and reindexing"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Array Routes ===
        arrays::list_arrays,
        arrays::save_array,
        arrays::load_array,
        arrays::sort_array,
        arrays::delete_array,
        arrays::reindex_arrays,

        // === Health Routes ===
        health::ping,
        health::liveness,
        health::readiness,

        // === Observability ===
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Array Types ===
            SaveArrayRequest, ArrayRecordResponse, SavedArrayResponse, LoadArrayResponse,
            SortedArrayResponse, DeletedArrayResponse, ReindexResponse, IdRemap,

            // === Domain Types ===
            ArrayRecord,

            // === Health Types ===
            HealthResponse, HealthStatus, HealthDetails, ComponentHealth,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
