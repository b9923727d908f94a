//! In-memory array store.
//!
//! Used by tests and local development. Reindexing stages the renumbered
//! rows on a copy and swaps it in only after every remap has been applied,
//! which gives the same all-or-nothing behaviour as a database transaction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use sortbox_core::{
    format_array, plan_reindex, ArrayId, ArrayRecord, ReindexPlan, SortboxError, SortboxResult,
    StorageError,
};

use crate::ArrayStore;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<ArrayId, ArrayRecord>,
    next_id: ArrayId,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory store backed by an ordered map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArrayStore {
    table: Arc<RwLock<Table>>,
    fail_next_reindex: Arc<AtomicBool>,
}

impl InMemoryArrayStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next [`reindex`](ArrayStore::reindex) fail after applying
    /// part of its plan. The store must come out unchanged.
    pub fn fail_next_reindex(&self) {
        self.fail_next_reindex.store(true, Ordering::SeqCst);
    }

    /// Current ids in ascending order.
    pub fn ids(&self) -> SortboxResult<Vec<ArrayId>> {
        Ok(self.read()?.rows.keys().copied().collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, StorageError> {
        self.table.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, StorageError> {
        self.table.write().map_err(|_| StorageError::LockPoisoned)
    }
}

fn aborted(applied: usize, total: usize) -> SortboxError {
    tracing::warn!(applied, total, "Reindex aborted, rolling back");
    StorageError::TransactionFailed {
        reason: format!("reindex aborted after {} of {} remaps", applied, total),
    }
    .into()
}

#[async_trait]
impl ArrayStore for InMemoryArrayStore {
    async fn insert(&self, data: &[i64], is_sorted: bool) -> SortboxResult<ArrayId> {
        let mut table = self.write()?;
        let id = table.next_id;
        table.next_id += 1;
        table.rows.insert(
            id,
            ArrayRecord {
                id,
                data: data.to_vec(),
                is_sorted,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn list(&self) -> SortboxResult<Vec<ArrayRecord>> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn get(&self, id: ArrayId) -> SortboxResult<Option<ArrayRecord>> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn load(&self, id: ArrayId) -> SortboxResult<String> {
        let table = self.read()?;
        let record = table.rows.get(&id).ok_or(StorageError::NotFound { id })?;
        Ok(format_array(&record.data))
    }

    async fn update(&self, id: ArrayId, data: &[i64], is_sorted: bool) -> SortboxResult<()> {
        let mut table = self.write()?;
        let record = table.rows.get_mut(&id).ok_or(StorageError::NotFound { id })?;
        record.data = data.to_vec();
        record.is_sorted = is_sorted;
        Ok(())
    }

    async fn delete(&self, id: ArrayId) -> SortboxResult<bool> {
        Ok(self.write()?.rows.remove(&id).is_some())
    }

    async fn reindex(&self) -> SortboxResult<ReindexPlan> {
        let mut table = self.write()?;
        let plan = plan_reindex(table.rows.values().map(|r| (r.id, r.created_at)));

        let mut staged = table.rows.clone();
        let moved: Vec<ArrayRecord> = plan
            .remaps
            .iter()
            .filter_map(|remap| staged.remove(&remap.old_id))
            .collect();

        let fail_after = self
            .fail_next_reindex
            .swap(false, Ordering::SeqCst)
            .then(|| moved.len() / 2);

        for (applied, (mut record, remap)) in moved.into_iter().zip(&plan.remaps).enumerate() {
            if fail_after == Some(applied) {
                return Err(aborted(applied, plan.remaps.len()));
            }
            record.id = remap.new_id;
            staged.insert(remap.new_id, record);
        }
        if fail_after.is_some() {
            return Err(aborted(plan.remaps.len(), plan.remaps.len()));
        }

        table.rows = staged;
        table.next_id = plan.next_id();
        Ok(plan)
    }

    async fn clear(&self) -> SortboxResult<()> {
        *self.write()? = Table::default();
        Ok(())
    }

    async fn count(&self) -> SortboxResult<usize> {
        Ok(self.read()?.rows.len())
    }

    async fn ping(&self) -> SortboxResult<()> {
        self.read().map(|_| ()).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortbox_core::ids_are_contiguous;

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        assert_eq!(store.insert(&[3, 1, 2], false).await?, 1);
        assert_eq!(store.insert(&[7], true).await?, 2);
        assert_eq!(store.count().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_and_load() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        let id = store.insert(&[3, -1, 2], false).await?;

        let record = store.get(id).await?.ok_or(StorageError::NotFound { id })?;
        assert_eq!(record.data, vec![3, -1, 2]);
        assert!(!record.is_sorted);
        assert_eq!(store.load(id).await?, "3,-1,2");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_ids() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        assert!(store.get(42).await?.is_none());
        assert!(matches!(
            store.load(42).await,
            Err(SortboxError::Storage(StorageError::NotFound { id: 42 }))
        ));
        assert!(store.update(42, &[1], true).await.is_err());
        assert!(!store.delete(42).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_in_place() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        let id = store.insert(&[2, 1], false).await?;
        store.update(id, &[1, 2], true).await?;

        let record = store.get(id).await?.ok_or(StorageError::NotFound { id })?;
        assert_eq!(record.data, vec![1, 2]);
        assert!(record.is_sorted);
        Ok(())
    }

    #[tokio::test]
    async fn test_reindex_after_delete_closes_gap() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        for values in [[1], [2], [3], [4]] {
            store.insert(&values, false).await?;
        }
        assert!(store.delete(2).await?);

        let plan = store.reindex().await?;
        assert_eq!(plan.total, 3);
        assert_eq!(store.ids()?, vec![1, 2, 3]);

        let records = store.list().await?;
        let data: Vec<Vec<i64>> = records.into_iter().map(|r| r.data).collect();
        assert_eq!(data, vec![vec![1], vec![3], vec![4]]);

        // Id generation continues after the renumbered range.
        assert_eq!(store.insert(&[5], false).await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_reindex_leaves_ids_unchanged() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        for values in [[10], [20], [30], [40], [50]] {
            store.insert(&values, false).await?;
        }
        store.delete(1).await?;
        let before = store.list().await?;

        store.fail_next_reindex();
        let result = store.reindex().await;
        assert!(matches!(
            result,
            Err(SortboxError::Storage(StorageError::TransactionFailed { .. }))
        ));
        assert_eq!(store.list().await?, before);

        // The fault is one-shot.
        store.reindex().await?;
        assert!(ids_are_contiguous(&store.ids()?));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_restarts_ids() -> SortboxResult<()> {
        let store = InMemoryArrayStore::new();
        store.insert(&[1], false).await?;
        store.insert(&[2], false).await?;
        store.clear().await?;

        assert_eq!(store.count().await?, 0);
        assert_eq!(store.insert(&[3], false).await?, 1);
        store.ping().await?;
        Ok(())
    }
}
