//! Array-related API types

use serde::{Deserialize, Serialize};
use sortbox_core::{ArrayId, ArrayRecord, IdRemap, ReindexPlan, Timestamp};

// ============================================================================
// REQUESTS
// ============================================================================

/// Request to store a new array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SaveArrayRequest {
    /// Comma-separated integers, e.g. `"3, 1, 2"`
    pub array: String,
    /// Whether the caller already considers the array sorted
    #[serde(rename = "isSorted", default)]
    pub is_sorted: bool,
}

/// `?id=N` query of the load, sort and delete endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct IdQuery {
    /// Array id
    pub id: Option<String>,
}

// ============================================================================
// RESPONSES
// ============================================================================

/// A stored array as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ArrayRecordResponse {
    pub id: ArrayId,
    /// Comma-separated stored values
    pub array_data: String,
    pub is_sorted: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl From<ArrayRecord> for ArrayRecordResponse {
    fn from(record: ArrayRecord) -> Self {
        Self {
            id: record.id,
            array_data: record.array_data(),
            is_sorted: record.is_sorted,
            created_at: record.created_at,
        }
    }
}

/// Result of saving an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SavedArrayResponse {
    /// Id of the new array after reindexing
    pub id: ArrayId,
    /// All arrays after reindexing
    pub arrays: Vec<ArrayRecordResponse>,
}

/// Raw stored text of one array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LoadArrayResponse {
    pub array: String,
}

/// Result of sorting an array into a new row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SortedArrayResponse {
    /// Id of the sorted copy after reindexing
    pub id: ArrayId,
    /// Sorted values, comma-separated
    pub array: String,
    /// All arrays after reindexing
    pub arrays: Vec<ArrayRecordResponse>,
}

/// Result of deleting an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeletedArrayResponse {
    /// Id the array had when it was deleted
    pub id: ArrayId,
    /// Whether a row had this id
    pub removed: bool,
    /// Number of arrays left
    pub total: usize,
}

/// Result of a reindex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReindexResponse {
    /// Number of arrays covered
    pub total: usize,
    /// Ids that changed
    pub remapped: Vec<IdRemap>,
}

impl From<ReindexPlan> for ReindexResponse {
    fn from(plan: ReindexPlan) -> Self {
        Self {
            total: plan.total,
            remapped: plan.remaps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_save_request_field_names() -> Result<(), serde_json::Error> {
        let req: SaveArrayRequest =
            serde_json::from_str(r#"{"array": "3,1,2", "isSorted": true}"#)?;
        assert_eq!(req.array, "3,1,2");
        assert!(req.is_sorted);

        let req: SaveArrayRequest = serde_json::from_str(r#"{"array": "5"}"#)?;
        assert!(!req.is_sorted);
        Ok(())
    }

    #[test]
    fn test_record_response_shape() -> Result<(), serde_json::Error> {
        let record = ArrayRecord {
            id: 2,
            data: vec![1, -2],
            is_sorted: false,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ArrayRecordResponse::from(record))?;
        assert_eq!(json["id"], 2);
        assert_eq!(json["array_data"], "1,-2");
        assert_eq!(json["is_sorted"], false);
        assert!(json.get("created_at").is_some());
        Ok(())
    }
}
