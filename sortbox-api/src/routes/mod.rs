//! HTTP Surface
//!
//! `create_api_router` assembles the array routes, the health probes, the
//! metrics and OpenAPI documents and, when a directory is configured, the
//! static frontend. Anything else is answered with a JSON 404.

pub mod arrays;
pub mod health;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, Uri},
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use sortbox_storage::ArrayStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::openapi::ApiDoc;
use crate::telemetry::{metrics_handler, observability_middleware, TelemetryConfig};

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}

// ============================================================================
// CORS
// ============================================================================

/// Any origin while `cors_origins` is empty, otherwise only the listed ones.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.is_production() {
        tracing::info!("CORS open to any origin");
        return cors.allow_origin(Any);
    }

    tracing::info!(origins = ?config.cors_origins, "CORS restricted");
    let allowed = config.clone();
    cors.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        origin
            .to_str()
            .is_ok_and(|origin| allowed.is_origin_allowed(origin))
    }))
}

// ============================================================================
// STATIC FRONTEND
// ============================================================================

/// Serve `/static/*` from `dir` and `/` from its `index.html`.
fn with_static_frontend(router: Router, config: &ApiConfig) -> ApiResult<Router> {
    let Some(dir) = config.static_dir.as_ref() else {
        return Ok(router);
    };

    if !dir.is_dir() {
        return Err(ApiError::invalid_input(format!(
            "Static directory {} does not exist",
            dir.display()
        )));
    }

    tracing::info!(dir = %dir.display(), "Serving static frontend");
    Ok(router
        .nest_service("/static", ServeDir::new(dir))
        .route_service("/", ServeFile::new(dir.join("index.html"))))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the full application router.
///
/// | Path | Served when |
/// |------|-------------|
/// | `/arrays/*` | always |
/// | `/health/*` | always |
/// | `/openapi.json` | always |
/// | `/metrics` | `telemetry.metrics_enabled` |
/// | `/swagger-ui` | `swagger-ui` feature |
/// | `/`, `/static/*` | `api_config.static_dir` is set |
///
/// # Errors
/// Fails when the configured static directory does not exist.
pub fn create_api_router(
    store: Arc<dyn ArrayStore>,
    api_config: &ApiConfig,
    telemetry: &TelemetryConfig,
) -> ApiResult<Router> {
    let mut router = Router::new()
        .nest("/arrays", arrays::create_router(store.clone()))
        .nest("/health", health::create_router(store))
        .route("/openapi.json", get(openapi_json));

    if telemetry.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        // SwaggerUi registers its own document route; /openapi.json is taken.
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/swagger-ui/openapi.json", ApiDoc::openapi()),
        );
    }

    let router = with_static_frontend(router, api_config)?.fallback(route_not_found);

    // Outermost first: CORS, then observability, then the handler.
    Ok(router
        .layer(from_fn(observability_middleware))
        .layer(cors_layer(api_config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_static_dir_is_rejected() {
        let config = ApiConfig {
            static_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        let err = with_static_frontend(Router::new(), &config).err();
        assert_eq!(err.map(|e| e.code), Some(crate::error::ErrorCode::InvalidInput));
    }
}
