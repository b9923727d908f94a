//! Error Types for SORTBOX API
//!
//! Every failure leaves a handler as an [`ApiError`] and is rendered as
//! `{success: false, code, message}` with the status of its [`ErrorCode`].

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sortbox_core::{SortboxError, StorageError};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body or query contains invalid input data
    InvalidInput,

    /// Required field or query parameter is missing
    MissingField,

    /// Array text is not a comma-separated list of integers
    InvalidFormat,

    // ========================================================================
    // Routing Errors (404, 405)
    // ========================================================================
    /// Requested array does not exist
    ArrayNotFound,

    /// No route matches the request path
    RouteNotFound,

    /// Route exists but does not accept this method
    MethodNotAllowed,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Database operation failed
    DatabaseError,

    /// Reindex transaction failed and was rolled back
    ReindexFailed,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Database connection pool exhausted
    ConnectionPoolExhausted,
}

impl ErrorCode {
    /// HTTP status this category is answered with.
    pub fn status_code(&self) -> StatusCode {
        use ErrorCode::*;
        match self {
            InvalidInput | MissingField | InvalidFormat => StatusCode::BAD_REQUEST,
            ArrayNotFound | RouteNotFound => StatusCode::NOT_FOUND,
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServiceUnavailable | ConnectionPoolExhausted => StatusCode::SERVICE_UNAVAILABLE,
            InternalError | DatabaseError | ReindexFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire name, as serialized in the `code` field.
    pub fn as_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            InvalidInput => "INVALID_INPUT",
            MissingField => "MISSING_FIELD",
            InvalidFormat => "INVALID_FORMAT",
            ArrayNotFound => "ARRAY_NOT_FOUND",
            RouteNotFound => "ROUTE_NOT_FOUND",
            MethodNotAllowed => "METHOD_NOT_ALLOWED",
            InternalError => "INTERNAL_ERROR",
            DatabaseError => "DATABASE_ERROR",
            ReindexFailed => "REINDEX_FAILED",
            ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ConnectionPoolExhausted => "CONNECTION_POOL_EXHAUSTED",
        }
    }

    pub fn default_message(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            InvalidInput => "Request could not be read",
            MissingField => "A required parameter is missing",
            InvalidFormat => "Array must be comma-separated integers",
            ArrayNotFound => "No array with this id",
            RouteNotFound => "No such route",
            MethodNotAllowed => "Method not allowed",
            InternalError => "Unexpected server failure",
            DatabaseError => "Array store failure",
            ReindexFailed => "Reindex rolled back",
            ServiceUnavailable => "Array store unavailable",
            ConnectionPoolExhausted => "No database connection available",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// A failed request: a category plus a message for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Error carrying [`ErrorCode::default_message`].
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // 400

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// `field` names the missing body field or query parameter.
    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorCode::MissingField, format!("Parameter '{}' is required", field))
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFormat, message)
    }

    // 404 / 405

    pub fn array_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ArrayNotFound, format!("Array with id {} not found", id))
    }

    pub fn route_not_found(path: &str) -> Self {
        Self::new(ErrorCode::RouteNotFound, format!("No route for {}", path))
    }

    pub fn method_not_allowed(method: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MethodNotAllowed,
            format!("Method {} is not allowed on this route", method),
        )
    }

    // 500 / 503

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn connection_pool_exhausted() -> Self {
        ErrorCode::ConnectionPoolExhausted.into()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Wire form of a failed response.
#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    code: ErrorCode,
    message: &'a str,
}

/// Render the failure envelope so handlers can return `ApiError` directly:
/// ```ignore
/// async fn handler() -> Result<Json<Envelope<T>>, ApiError> {
///     Err(ApiError::array_not_found(7))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorEnvelope {
            success: false,
            code: self.code,
            message: &self.message,
        });
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN AND STANDARD ERRORS
// ============================================================================

/// Convert from the domain error to ApiError.
impl From<SortboxError> for ApiError {
    fn from(err: SortboxError) -> Self {
        match err {
            SortboxError::Parse(e) => ApiError::invalid_format(format!("Invalid array: {}", e)),
            SortboxError::Storage(StorageError::NotFound { id }) => ApiError::array_not_found(id),
            SortboxError::Storage(e @ StorageError::TransactionFailed { .. }) => {
                tracing::error!(error = %e, "Reindex rolled back");
                ApiError::new(ErrorCode::ReindexFailed, e.to_string())
            }
            SortboxError::Storage(StorageError::Unavailable { reason }) => {
                tracing::warn!(%reason, "Storage unavailable");
                ApiError::service_unavailable(reason)
            }
            SortboxError::Storage(StorageError::LockPoisoned) => {
                tracing::error!("Store lock poisoned");
                ApiError::internal_error("Store is unavailable")
            }
            SortboxError::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                ApiError::database_error(e.to_string())
            }
        }
    }
}

/// Driver errors are logged in full; clients only see the category.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!(error = ?err, "PostgreSQL error");
        ErrorCode::DatabaseError.into()
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!(error = ?err, "Pool checkout failed");
        match err {
            deadpool_postgres::PoolError::Timeout(_) => ApiError::connection_pool_exhausted(),
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Connection pool closed")
            }
            _ => ErrorCode::DatabaseError.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("Malformed JSON: {}", err))
    }
}

/// Convert a rejected JSON body to ApiError.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

/// Convert a rejected query string to ApiError.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_input(format!("Invalid query: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
