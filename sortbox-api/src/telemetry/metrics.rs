//! Prometheus collectors for request traffic and store operations, and the
//! `/metrics` scrape handler.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge, CounterVec, HistogramVec,
    IntGauge, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// Seconds. A save or sort does several store round trips plus a reindex.
const HTTP_LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.025, 0.1, 0.25, 1.0, 2.5, 10.0];

/// Seconds.
const STORE_LATENCY_BUCKETS: &[f64] =
    &[0.0001, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0];

/// Registered on first use. Recording sites skip metrics when registration failed.
pub static METRICS: Lazy<ApiResult<SortboxMetrics>> = Lazy::new(SortboxMetrics::new);

#[derive(Clone)]
pub struct SortboxMetrics {
    /// `method`, `path`, `status`
    pub http_requests_total: CounterVec,
    /// `method`, `path`
    pub http_request_duration_seconds: HistogramVec,
    /// `operation`, `status` (`success` | `error`)
    pub store_operations_total: CounterVec,
    /// `operation`
    pub store_operation_duration_seconds: HistogramVec,
    pub arrays_stored: IntGauge,
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

impl SortboxMetrics {
    /// Register every collector with the default registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "sortbox_http_requests_total",
                "HTTP requests by route and status",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "sortbox_http_request_duration_seconds",
                "HTTP request latency in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            store_operations_total: register_counter_vec!(
                "sortbox_store_operations_total",
                "Total number of array store operations",
                &["operation", "status"]
            )
            .map_err(|e| registration_error("store_operations_total", e))?,

            store_operation_duration_seconds: register_histogram_vec!(
                "sortbox_store_operation_duration_seconds",
                "Array store operation duration in seconds",
                &["operation"],
                STORE_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("store_operation_duration_seconds", e))?,

            arrays_stored: register_int_gauge!(
                "sortbox_arrays_stored",
                "Number of stored arrays after the last reindex"
            )
            .map_err(|e| registration_error("arrays_stored", e))?,
        })
    }

    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    pub fn record_store_operation(&self, operation: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.store_operations_total
            .with_label_values(&[operation, status])
            .inc();
        self.store_operation_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn set_arrays_stored(&self, count: usize) {
        self.arrays_stored.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

fn encode_metrics() -> Result<String, prometheus::Error> {
    TextEncoder::new().encode_to_string(&prometheus::gather())
}

/// GET /metrics - Prometheus text exposition
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus text format", content_type = "text/plain"),
        (status = 500, description = "Encoding failed"),
    ),
)]
pub async fn metrics_handler() -> Response {
    // A scrape before any request still registers the collectors.
    if let Err(e) = METRICS.as_ref() {
        tracing::warn!(error = %e, "Metrics unavailable");
    }

    match encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Result<&'static SortboxMetrics, String> {
        METRICS.as_ref().map_err(|e| e.to_string())
    }

    #[test]
    fn test_store_error_is_labelled() -> Result<(), String> {
        let m = metrics()?;
        m.record_store_operation("insert", true, 0.005);
        m.record_store_operation("reindex", false, 0.010);
        let errors = m
            .store_operations_total
            .with_label_values(&["reindex", "error"])
            .get();
        assert!(errors >= 1.0);
        Ok(())
    }

    #[test]
    fn test_exposition_contains_collectors() -> Result<(), String> {
        let m = metrics()?;
        m.record_http_request("GET", "/arrays", 200, 0.015);
        m.set_arrays_stored(3);

        let text = encode_metrics().map_err(|e| e.to_string())?;
        assert!(text.contains("sortbox_http_requests_total"));
        assert!(text.contains("sortbox_arrays_stored"));
        Ok(())
    }
}
