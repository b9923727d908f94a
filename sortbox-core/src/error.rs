//! Error types for SORTBOX operations

use crate::ArrayId;
use thiserror::Error;

/// Errors produced while parsing the comma-separated array format.
///
/// Both variants belong to the `InvalidFormat` category at the API layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("element '{token}' is not an integer")]
    InvalidToken { token: String },

    #[error("array must not be empty")]
    Empty,
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Array not found: id {id}")]
    NotFound { id: ArrayId },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Update failed for id {id}: {reason}")]
    UpdateFailed { id: ArrayId, reason: String },

    #[error("Delete failed for id {id}: {reason}")]
    DeleteFailed { id: ArrayId, reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Stored array {id} is corrupt: {reason}")]
    CorruptRecord { id: ArrayId, reason: String },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Storage backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all SORTBOX errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SortboxError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SortboxError {
    /// Whether this error means the requested array does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SortboxError::Storage(StorageError::NotFound { .. }))
    }
}

/// Result type alias for SORTBOX operations.
pub type SortboxResult<T> = Result<T, SortboxError>;

// =============================================================================
// TESTS
// =============================================================================
