//! Array REST API Routes
//!
//! Axum route handlers for array operations. Handlers delegate to
//! [`array_service`](crate::services::array_service) and wrap results in the
//! response envelope.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sortbox_storage::ArrayStore;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::ArrayIdParam,
    services::array_service,
    types::{
        ArrayRecordResponse, DeletedArrayResponse, Envelope, IdQuery, LoadArrayResponse,
        ReindexResponse, SaveArrayRequest, SavedArrayResponse, SortedArrayResponse,
    },
};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for array routes.
#[derive(Clone)]
pub struct ArrayState {
    pub store: Arc<dyn ArrayStore>,
}

impl ArrayState {
    pub fn new(store: Arc<dyn ArrayStore>) -> Self {
        Self { store }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /arrays - List all arrays
#[utoipa::path(
    get,
    path = "/arrays",
    tag = "Arrays",
    responses(
        (status = 200, description = "All arrays ordered by id", body = Envelope<Vec<ArrayRecordResponse>>),
        (status = 500, description = "Storage failure", body = ApiError),
    ),
)]
pub async fn list_arrays(State(state): State<Arc<ArrayState>>) -> ApiResult<impl IntoResponse> {
    let arrays = array_service::list_arrays(state.store.as_ref()).await?;
    Ok(Json(Envelope::data(arrays)))
}

/// POST /arrays/save - Store a new array
#[utoipa::path(
    post,
    path = "/arrays/save",
    tag = "Arrays",
    request_body = SaveArrayRequest,
    responses(
        (status = 201, description = "Array saved and ids reindexed", body = Envelope<SavedArrayResponse>),
        (status = 400, description = "Invalid body or array format", body = ApiError),
        (status = 500, description = "Storage or reindex failure", body = ApiError),
    ),
)]
pub async fn save_array(
    State(state): State<Arc<ArrayState>>,
    payload: Result<Json<SaveArrayRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    let saved = array_service::save_array(state.store.as_ref(), &req).await?;
    let message = format!("Array saved. Ids reindexed. New id: {}", saved.id);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::data(saved).with_message(message)),
    ))
}

/// GET /arrays/load?id=N - Raw stored text of one array
#[utoipa::path(
    get,
    path = "/arrays/load",
    tag = "Arrays",
    params(IdQuery),
    responses(
        (status = 200, description = "Stored array text", body = Envelope<LoadArrayResponse>),
        (status = 400, description = "Missing or invalid id", body = ApiError),
        (status = 404, description = "Array not found", body = ApiError),
    ),
)]
pub async fn load_array(
    State(state): State<Arc<ArrayState>>,
    ArrayIdParam(id): ArrayIdParam,
) -> ApiResult<impl IntoResponse> {
    let loaded = array_service::load_array(state.store.as_ref(), id).await?;
    Ok(Json(Envelope::data(loaded)))
}

/// POST /arrays/sort?id=N - Store a sorted copy of an array
#[utoipa::path(
    post,
    path = "/arrays/sort",
    tag = "Arrays",
    params(IdQuery),
    responses(
        (status = 200, description = "Sorted copy stored and ids reindexed", body = Envelope<SortedArrayResponse>),
        (status = 400, description = "Missing or invalid id, or unparsable stored array", body = ApiError),
        (status = 404, description = "Array not found", body = ApiError),
        (status = 500, description = "Storage or reindex failure", body = ApiError),
    ),
)]
pub async fn sort_array(
    State(state): State<Arc<ArrayState>>,
    ArrayIdParam(id): ArrayIdParam,
) -> ApiResult<impl IntoResponse> {
    let sorted = array_service::sort_array(state.store.as_ref(), id).await?;
    Ok(Json(
        Envelope::data(sorted).with_message("Array sorted. Ids reindexed."),
    ))
}

/// DELETE|POST /arrays/delete?id=N - Delete an array
#[utoipa::path(
    delete,
    path = "/arrays/delete",
    tag = "Arrays",
    params(IdQuery),
    responses(
        (status = 200, description = "Array deleted, or no such id, and ids reindexed", body = Envelope<DeletedArrayResponse>),
        (status = 400, description = "Missing or invalid id", body = ApiError),
        (status = 500, description = "Storage or reindex failure", body = ApiError),
    ),
)]
pub async fn delete_array(
    State(state): State<Arc<ArrayState>>,
    ArrayIdParam(id): ArrayIdParam,
) -> ApiResult<impl IntoResponse> {
    let deleted = array_service::delete_array(state.store.as_ref(), id).await?;
    let message = if deleted.removed {
        "Array deleted."
    } else {
        "No array with that id. Arrays reindexed."
    };
    Ok(Json(Envelope::data(deleted).with_message(message)))
}

/// POST /arrays/reindex - Renumber ids to 1..N
#[utoipa::path(
    post,
    path = "/arrays/reindex",
    tag = "Arrays",
    responses(
        (status = 200, description = "Ids reindexed", body = Envelope<ReindexResponse>),
        (status = 500, description = "Reindex failed and was rolled back", body = ApiError),
    ),
)]
pub async fn reindex_arrays(
    State(state): State<Arc<ArrayState>>,
) -> ApiResult<impl IntoResponse> {
    let outcome = array_service::reindex_arrays(state.store.as_ref()).await?;
    Ok(Json(Envelope::data(outcome).with_message("Arrays reindexed.")))
}

/// Fallback for methods a route does not accept.
async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(method)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the array router, mounted under `/arrays`.
pub fn create_router(store: Arc<dyn ArrayStore>) -> Router {
    let state = Arc::new(ArrayState::new(store));

    Router::new()
        .route("/", get(list_arrays).fallback(method_not_allowed))
        .route("/save", post(save_array).fallback(method_not_allowed))
        .route("/load", get(load_array).fallback(method_not_allowed))
        .route("/sort", post(sort_array).fallback(method_not_allowed))
        .route(
            "/delete",
            post(delete_array)
                .delete(delete_array)
                .fallback(method_not_allowed),
        )
        .route("/reindex", post(reindex_arrays).fallback(method_not_allowed))
        .with_state(state)
}
