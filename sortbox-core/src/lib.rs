//! SORTBOX Core - Entity Types and Pure Operations
//!
//! Data types shared by every other crate, plus the three pieces of pure
//! logic the service is built around:
//! - `parse`: comma-separated text <-> integer sequences
//! - `sort`: in-place selection sort
//! - `reindex`: contiguous id planning ordered by creation time
//!
//! Nothing in this crate performs I/O.

pub mod error;
pub mod parse;
pub mod reindex;
pub mod sort;

pub use error::{ParseError, SortboxError, SortboxResult, StorageError};
pub use parse::{format_array, parse_array};
pub use reindex::{ids_are_contiguous, plan_reindex, IdRemap, ReindexPlan};
pub use sort::{selection_sort, selection_sorted};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Surrogate key of a stored array.
///
/// Ids are not stable: the reindexer reassigns them after every mutation so
/// that they always form the range `1..=N`.
pub type ArrayId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

// ============================================================================
// ARRAY RECORD
// ============================================================================

/// A stored integer array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ArrayRecord {
    /// Current surrogate key (reassigned by reindexing)
    pub id: ArrayId,
    /// Stored values in insertion order (or ascending when `is_sorted`)
    pub data: Vec<i64>,
    /// Whether the values were stored as the output of a sort
    pub is_sorted: bool,
    /// Insertion time, the ordering anchor for reindexing
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl ArrayRecord {
    /// Serialized form of `data` as persisted in the `array_data` column.
    pub fn array_data(&self) -> String {
        format_array(&self.data)
    }

    /// Number of elements in the array.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no elements.
    ///
    /// The parser never produces an empty array, so stored records are
    /// non-empty unless written through a lower-level path.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A copy of this record with its values sorted ascending.
    ///
    /// The copy keeps the id and timestamp; stores assign new ones on insert.
    pub fn sorted_copy(&self) -> ArrayRecord {
        ArrayRecord {
            data: selection_sorted(self.data.clone()),
            is_sorted: true,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(data: Vec<i64>) -> ArrayRecord {
        ArrayRecord {
            id: 1,
            data,
            is_sorted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_array_data_serialization() {
        assert_eq!(record(vec![3, -1, 2]).array_data(), "3,-1,2");
        assert_eq!(record(vec![42]).array_data(), "42");
    }

    #[test]
    fn test_sorted_copy() {
        let original = record(vec![3, 1, 2]);
        let sorted = original.sorted_copy();

        assert_eq!(sorted.data, vec![1, 2, 3]);
        assert!(sorted.is_sorted);
        assert_eq!(original.data, vec![3, 1, 2]);
        assert!(!original.is_sorted);
    }

    #[test]
    fn test_len() {
        let r = record(vec![5, 5, 5]);
        assert_eq!(r.len(), 3);
        assert!(!r.is_empty());
    }
}
