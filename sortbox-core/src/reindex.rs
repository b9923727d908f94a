//! Reindex planning.
//!
//! A reindex renumbers every row to `1..=N` ordered by creation time. The
//! plan is computed here, once, from `(id, created_at)` pairs; stores only
//! have to apply it atomically.

use crate::{ArrayId, Timestamp};
use serde::{Deserialize, Serialize};

/// One id that changes during a reindex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IdRemap {
    pub old_id: ArrayId,
    pub new_id: ArrayId,
}

/// The outcome of planning (and, once applied, of running) a reindex.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReindexPlan {
    /// Number of rows covered by the plan.
    pub total: usize,
    /// Rows whose id changes, in new-id order.
    pub remaps: Vec<IdRemap>,
}

impl ReindexPlan {
    /// True when every row already holds its final id.
    pub fn is_noop(&self) -> bool {
        self.remaps.is_empty()
    }

    /// Translate an id observed before the reindex into its new value.
    ///
    /// Ids that did not move are returned unchanged.
    pub fn resolve(&self, old_id: ArrayId) -> ArrayId {
        self.remaps
            .iter()
            .find(|r| r.old_id == old_id)
            .map(|r| r.new_id)
            .unwrap_or(old_id)
    }

    /// The id the store should hand out next once the plan is applied.
    pub fn next_id(&self) -> ArrayId {
        self.total as ArrayId + 1
    }
}

/// Compute the renumbering for a set of rows.
///
/// Rows are ordered by `created_at`; ties fall back to the current id so
/// that the result is deterministic.
pub fn plan_reindex<I>(rows: I) -> ReindexPlan
where
    I: IntoIterator<Item = (ArrayId, Timestamp)>,
{
    let mut rows: Vec<(ArrayId, Timestamp)> = rows.into_iter().collect();
    rows.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let remaps = rows
        .iter()
        .enumerate()
        .filter_map(|(index, (old_id, _))| {
            let new_id = index as ArrayId + 1;
            (*old_id != new_id).then_some(IdRemap {
                old_id: *old_id,
                new_id,
            })
        })
        .collect();

    ReindexPlan {
        total: rows.len(),
        remaps,
    }
}

/// Check that `ids` is exactly `{1..=ids.len()}` (in any order).
pub fn ids_are_contiguous(ids: &[ArrayId]) -> bool {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, id)| *id == index as ArrayId + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn at(seconds: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn test_plan_empty() {
        let plan = plan_reindex(Vec::new());
        assert_eq!(plan.total, 0);
        assert!(plan.is_noop());
        assert_eq!(plan.next_id(), 1);
    }

    #[test]
    fn test_plan_already_contiguous_is_noop() {
        let plan = plan_reindex(vec![(1, at(0)), (2, at(1)), (3, at(2))]);
        assert_eq!(plan.total, 3);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_plan_closes_gap_after_delete() {
        // Row 2 was deleted.
        let plan = plan_reindex(vec![(1, at(0)), (3, at(2)), (4, at(3))]);
        assert_eq!(
            plan.remaps,
            vec![
                IdRemap { old_id: 3, new_id: 2 },
                IdRemap { old_id: 4, new_id: 3 },
            ]
        );
        assert_eq!(plan.resolve(4), 3);
        assert_eq!(plan.resolve(1), 1);
        assert_eq!(plan.next_id(), 4);
    }

    #[test]
    fn test_plan_orders_by_creation_time_not_id() {
        let plan = plan_reindex(vec![(1, at(10)), (2, at(5))]);
        assert_eq!(plan.resolve(2), 1);
        assert_eq!(plan.resolve(1), 2);
    }

    #[test]
    fn test_plan_breaks_timestamp_ties_by_id() {
        let plan = plan_reindex(vec![(9, at(0)), (4, at(0))]);
        assert_eq!(plan.resolve(4), 1);
        assert_eq!(plan.resolve(9), 2);
    }

    #[test]
    fn test_ids_are_contiguous() {
        assert!(ids_are_contiguous(&[]));
        assert!(ids_are_contiguous(&[2, 1, 3]));
        assert!(!ids_are_contiguous(&[1, 3]));
        assert!(!ids_are_contiguous(&[0, 1]));
        assert!(!ids_are_contiguous(&[1, 1, 2]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Applying a plan to any set of distinct ids yields `1..=N` in creation order.
        #[test]
        fn prop_applied_plan_is_contiguous_in_creation_order(
            rows in prop::collection::btree_map(1i64..10_000, 0i64..1_000, 0..50)
        ) {
            let rows: Vec<(ArrayId, Timestamp)> =
                rows.into_iter().map(|(id, offset)| (id, at(offset))).collect();
            let plan = plan_reindex(rows.clone());

            let mut applied: Vec<(ArrayId, Timestamp)> = rows
                .iter()
                .map(|(id, created_at)| (plan.resolve(*id), *created_at))
                .collect();
            let ids: Vec<ArrayId> = applied.iter().map(|(id, _)| *id).collect();
            prop_assert!(ids_are_contiguous(&ids));

            applied.sort_by_key(|(id, _)| *id);
            prop_assert!(applied.windows(2).all(|w| w[0].1 <= w[1].1));
        }
    }
}
