//! Shared helpers for router tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sortbox_api::telemetry::TelemetryConfig;
use sortbox_api::{create_api_router, ApiConfig, ApiError, ApiResult};
use sortbox_storage::{ArrayStore, InMemoryArrayStore};
use tower::ServiceExt; // for `oneshot`

/// Router over a fresh in-memory store, with metrics enabled.
pub fn test_router() -> ApiResult<(Router, Arc<InMemoryArrayStore>)> {
    let store = Arc::new(InMemoryArrayStore::new());
    let router = router_for(store.clone())?;
    Ok((router, store))
}

pub fn router_for(store: Arc<dyn ArrayStore>) -> ApiResult<Router> {
    let telemetry = TelemetryConfig {
        metrics_enabled: true,
        ..Default::default()
    };
    create_api_router(store, &ApiConfig::default(), &telemetry)
}

/// Response status plus the raw body.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> ApiResult<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
) -> ApiResult<TestResponse> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let response = router
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(TestResponse {
        status,
        body: body.to_vec(),
    })
}

/// POST /arrays/save and return the new id.
pub async fn save(router: &Router, array: &str) -> ApiResult<i64> {
    let body = format!(r#"{{"array":"{}","isSorted":false}}"#, array);
    let response = send(router, Method::POST, "/arrays/save", Some(&body)).await?;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()?["data"]["id"]
        .as_i64()
        .ok_or_else(|| ApiError::internal_error("save response has no id"))
}

pub fn listed_ids(list: &Value) -> Vec<i64> {
    list["data"]
        .as_array()
        .map(|arrays| arrays.iter().filter_map(|a| a["id"].as_i64()).collect())
        .unwrap_or_default()
}
