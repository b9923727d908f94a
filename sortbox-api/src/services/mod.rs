//! Service Layer
//!
//! Business logic shared by the HTTP handlers and the benchmark binary.
//! Services take the store explicitly and return API-level results.

pub mod array_service;

pub use array_service::*;
