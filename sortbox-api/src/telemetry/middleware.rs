//! Axum Middleware for HTTP Request Tracing and Metrics
//!
//! Wraps every HTTP request in an `http_request` span, records Prometheus
//! metrics and logs completion.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Instant;
use tracing::{info_span, Instrument};

use super::metrics::METRICS;

/// Numeric path segment.
static ID_SEGMENT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"/\d+(/|$)").ok());

/// Label used for requests no route matched.
const UNMATCHED_PATH: &str = "{unmatched}";

/// Normalize a raw path for metrics/spans.
///
/// Static assets collapse to one label and numeric segments become `{id}`,
/// which keeps Prometheus label cardinality bounded.
fn normalize_path(path: &str) -> String {
    if path.starts_with("/static/") {
        return "/static/{file}".to_string();
    }
    match ID_SEGMENT.as_ref() {
        Some(pattern) => pattern.replace_all(path, "/{id}$1").into_owned(),
        None => UNMATCHED_PATH.to_string(),
    }
}

/// Route label for a request: the matched route template when routing
/// succeeded, otherwise the normalized raw path.
fn route_label(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| normalize_path(request.uri().path()))
}

/// Observability middleware for Axum.
///
/// This middleware wraps every request with:
/// 1. A tracing span
/// 2. Prometheus metrics recording
/// 3. Request/response logging
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = route_label(&request);

    let span = info_span!(
        "http_request",
        http.method = %method,
        http.target = %path,
        http.route = %route,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    let status = response.status();

    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_http_request(
            method.as_str(),
            &route,
            status.as_u16(),
            duration.as_secs_f64(),
        );
    }

    if status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric_id() {
        assert_eq!(normalize_path("/arrays/12345"), "/arrays/{id}");
        assert_eq!(normalize_path("/arrays/7/extra"), "/arrays/{id}/extra");
    }

    #[test]
    fn test_normalize_path_static() {
        assert_eq!(normalize_path("/static/js/app.js"), "/static/{file}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/arrays/save"), "/arrays/save");
        assert_eq!(normalize_path("/health/ready"), "/health/ready");
    }
}
