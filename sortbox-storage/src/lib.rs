//! SORTBOX Storage - Store Trait and In-Memory Implementation
//!
//! Defines the storage abstraction for array records. The PostgreSQL
//! implementation lives in sortbox-api next to the connection pool.

pub mod memory;

pub use memory::InMemoryArrayStore;

use async_trait::async_trait;
use sortbox_core::{ArrayId, ArrayRecord, ReindexPlan, SortboxResult};

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Async storage trait for array records.
///
/// Every mutating operation is followed by a [`reindex`](ArrayStore::reindex)
/// at the service layer; stores do not reindex on their own.
#[async_trait]
pub trait ArrayStore: Send + Sync {
    /// Insert a new array and return its (pre-reindex) id.
    async fn insert(&self, data: &[i64], is_sorted: bool) -> SortboxResult<ArrayId>;

    /// List all arrays ordered by id ascending.
    async fn list(&self) -> SortboxResult<Vec<ArrayRecord>>;

    /// Get an array by id.
    async fn get(&self, id: ArrayId) -> SortboxResult<Option<ArrayRecord>>;

    /// Load the raw stored text of an array.
    ///
    /// Returns `StorageError::NotFound` when no row has this id.
    async fn load(&self, id: ArrayId) -> SortboxResult<String>;

    /// Replace the values and sorted flag of an existing array in place.
    ///
    /// Returns `StorageError::NotFound` when no row has this id.
    async fn update(&self, id: ArrayId, data: &[i64], is_sorted: bool) -> SortboxResult<()>;

    /// Delete an array. Returns whether a row was removed.
    async fn delete(&self, id: ArrayId) -> SortboxResult<bool>;

    /// Renumber all rows to `1..=N` by creation time in one transaction.
    ///
    /// On failure nothing is renumbered.
    async fn reindex(&self) -> SortboxResult<ReindexPlan>;

    /// Remove every array and restart id generation at 1.
    async fn clear(&self) -> SortboxResult<()>;

    /// Number of stored arrays.
    async fn count(&self) -> SortboxResult<usize>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> SortboxResult<()>;
}
