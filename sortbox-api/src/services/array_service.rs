//! Array Service
//!
//! Every mutation is followed by a reindex, so ids seen by callers are
//! always `1..=N`. Ids returned from save and sort are translated through
//! the reindex plan.

use sortbox_core::{
    format_array, parse_array, selection_sorted, ArrayId, ReindexPlan, SortboxResult,
};
use sortbox_storage::ArrayStore;
use std::future::Future;
use std::time::Instant;

use crate::error::{ApiError, ApiResult};
use crate::telemetry::METRICS;
use crate::types::{
    ArrayRecordResponse, DeletedArrayResponse, LoadArrayResponse, ReindexResponse,
    SaveArrayRequest, SavedArrayResponse, SortedArrayResponse,
};

/// Run a store operation and record its outcome and latency.
async fn observed<T, F>(operation: &'static str, fut: F) -> SortboxResult<T>
where
    F: Future<Output = SortboxResult<T>>,
{
    let start = Instant::now();
    let result = fut.await;
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.record_store_operation(operation, result.is_ok(), start.elapsed().as_secs_f64());
    }
    result
}

async fn reindex(store: &dyn ArrayStore) -> ApiResult<ReindexPlan> {
    let plan = observed("reindex", store.reindex()).await?;
    if let Ok(metrics) = METRICS.as_ref() {
        metrics.set_arrays_stored(plan.total);
    }
    if !plan.is_noop() {
        tracing::debug!(
            total = plan.total,
            remapped = plan.remaps.len(),
            "Arrays reindexed"
        );
    }
    Ok(plan)
}

/// List all arrays ordered by id.
pub async fn list_arrays(store: &dyn ArrayStore) -> ApiResult<Vec<ArrayRecordResponse>> {
    let records = observed("list", store.list()).await?;
    Ok(records.into_iter().map(ArrayRecordResponse::from).collect())
}

/// Parse and store a new array, then reindex.
///
/// # Errors
/// `InvalidFormat` when the array text does not parse; storage errors
/// otherwise. A failed reindex leaves the new row in place under its
/// pre-reindex id.
pub async fn save_array(
    store: &dyn ArrayStore,
    req: &SaveArrayRequest,
) -> ApiResult<SavedArrayResponse> {
    let values = parse_array(&req.array).map_err(|e| ApiError::invalid_format(e.to_string()))?;

    let inserted = observed("insert", store.insert(&values, req.is_sorted)).await?;
    let plan = reindex(store).await?;
    let id = plan.resolve(inserted);

    tracing::info!(id, len = values.len(), is_sorted = req.is_sorted, "Array saved");

    Ok(SavedArrayResponse {
        id,
        arrays: list_arrays(store).await?,
    })
}

/// Raw stored text of one array.
pub async fn load_array(store: &dyn ArrayStore, id: ArrayId) -> ApiResult<LoadArrayResponse> {
    let array = observed("load", store.load(id)).await?;
    Ok(LoadArrayResponse { array })
}

/// Sort a stored array into a new row and reindex.
///
/// The source row is left untouched.
pub async fn sort_array(store: &dyn ArrayStore, id: ArrayId) -> ApiResult<SortedArrayResponse> {
    let text = observed("load", store.load(id)).await?;
    let values = parse_array(&text).map_err(|e| {
        ApiError::invalid_format(format!("Stored array {} is invalid: {}", id, e))
    })?;
    let sorted = selection_sorted(values);

    let inserted = observed("insert", store.insert(&sorted, true)).await?;
    let plan = reindex(store).await?;
    let copy_id = plan.resolve(inserted);

    tracing::info!(source_id = id, id = copy_id, len = sorted.len(), "Array sorted");

    Ok(SortedArrayResponse {
        id: copy_id,
        array: format_array(&sorted),
        arrays: list_arrays(store).await?,
    })
}

/// Sort a stored array in place.
///
/// Used by the benchmark binary; does not reindex since ids do not change.
pub async fn sort_in_place(store: &dyn ArrayStore, id: ArrayId) -> ApiResult<()> {
    let text = observed("load", store.load(id)).await?;
    let values = parse_array(&text).map_err(|e| ApiError::invalid_format(e.to_string()))?;
    observed("update", store.update(id, &selection_sorted(values), true)).await?;
    Ok(())
}

/// Delete an array and reindex.
///
/// A missing id is not an error: nothing is removed, the reindex still runs
/// and `removed` comes back `false`.
pub async fn delete_array(
    store: &dyn ArrayStore,
    id: ArrayId,
) -> ApiResult<DeletedArrayResponse> {
    let removed = observed("delete", store.delete(id)).await?;
    let plan = reindex(store).await?;

    if removed {
        tracing::info!(id, remaining = plan.total, "Array deleted");
    } else {
        tracing::debug!(id, remaining = plan.total, "No array to delete");
    }

    Ok(DeletedArrayResponse {
        id,
        removed,
        total: plan.total,
    })
}

/// Force a reindex.
pub async fn reindex_arrays(store: &dyn ArrayStore) -> ApiResult<ReindexResponse> {
    Ok(reindex(store).await?.into())
}

// =============================================================================
// TESTS
// =============================================================================
