//! SORTBOX API - REST Layer
//!
//! Exposes stored integer arrays over HTTP (Axum). Arrays are persisted in
//! PostgreSQL, sorted with selection sort, and renumbered to `1..=N` after
//! every mutation so clients always see contiguous ids.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{resolve_bind_addr, ApiConfig};
pub use db::{DbConfig, PgArrayStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use types::*;
