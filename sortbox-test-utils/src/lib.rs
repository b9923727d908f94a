//! SORTBOX Test Utilities
//!
//! Shared test infrastructure for the SORTBOX workspace:
//! - Random array generation (also used by the benchmark binary)
//! - Proptest generators for arrays and their text form
//! - Test fixtures for pre-populated stores
//! - Custom assertions for SORTBOX-specific validation

// Re-export the in-memory store from its source crate
pub use sortbox_storage::{ArrayStore, InMemoryArrayStore};

// Re-export core types for convenience
pub use sortbox_core::{
    format_array, ids_are_contiguous, parse_array, ArrayId, ArrayRecord, ParseError,
    SortboxError, SortboxResult, StorageError, Timestamp,
};

use chrono::{DateTime, Utc};

// ============================================================================
// RANDOM ARRAYS
// ============================================================================

/// Shortest generated array.
pub const RANDOM_MIN_LEN: usize = 5;

/// Longest generated array.
pub const RANDOM_MAX_LEN: usize = 54;

/// Lowest generated value (inclusive).
pub const RANDOM_MIN_VALUE: i64 = -500;

/// Highest generated value (exclusive).
pub const RANDOM_MAX_VALUE: i64 = 500;

/// Generate between 5 and 54 values in `-500..500`.
pub fn random_values() -> Vec<i64> {
    use rand::Rng;

    let mut rng = rand::rng();
    let len = rng.random_range(RANDOM_MIN_LEN..=RANDOM_MAX_LEN);
    (0..len)
        .map(|_| rng.random_range(RANDOM_MIN_VALUE..RANDOM_MAX_VALUE))
        .collect()
}

/// Generate a random array in its comma-separated text form.
pub fn random_array_string() -> String {
    format_array(&random_values())
}

fn timestamp(seconds: i64) -> Timestamp {
    DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default()
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating SORTBOX inputs.

    use super::*;
    use proptest::prelude::*;

    /// Generate a non-empty array of small integers.
    pub fn arb_values() -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(RANDOM_MIN_VALUE..RANDOM_MAX_VALUE, 1..60)
    }

    /// Generate an array of any `i64` values, possibly empty.
    pub fn arb_any_values() -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(any::<i64>(), 0..60)
    }

    /// Generate valid array text together with the values it parses to.
    ///
    /// Tokens carry random surrounding spaces and the text may contain
    /// empty tokens (`"1,,2"`), both of which the parser accepts.
    pub fn arb_array_text() -> impl Strategy<Value = (String, Vec<i64>)> {
        prop::collection::vec((any::<i64>(), " {0,2}", " {0,2}", prop::bool::weighted(0.1)), 1..30)
            .prop_map(|tokens| {
                let mut parts = Vec::with_capacity(tokens.len() * 2);
                let mut values = Vec::with_capacity(tokens.len());
                for (value, left, right, blank_before) in tokens {
                    if blank_before {
                        parts.push(" ".to_string());
                    }
                    parts.push(format!("{}{}{}", left, value, right));
                    values.push(value);
                }
                (parts.join(","), values)
            })
    }

    /// Generate a token that is not an integer.
    pub fn arb_invalid_token() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z]{1,8}",
            "[0-9]{1,4}\\.[0-9]{1,4}",
            "[0-9]{1,4}[a-z]{1,3}",
            Just("--1".to_string()),
            Just("99999999999999999999".to_string()),
        ]
    }

    /// Generate a stored record with an arbitrary id and creation time.
    pub fn arb_record() -> impl Strategy<Value = ArrayRecord> {
        (1i64..10_000, arb_values(), any::<bool>(), 0i64..4_000_000_000).prop_map(
            |(id, data, is_sorted, seconds)| ArrayRecord {
                id,
                data,
                is_sorted,
                created_at: timestamp(seconds),
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// Create an unsorted record with a fixed creation time.
    pub fn unsorted_record(id: ArrayId, data: Vec<i64>) -> ArrayRecord {
        ArrayRecord {
            id,
            data,
            is_sorted: false,
            created_at: timestamp(1_700_000_000 + id),
        }
    }

    /// Create a store holding `arrays` in order, with ids `1..=N`.
    pub async fn seeded_store(arrays: &[&[i64]]) -> SortboxResult<InMemoryArrayStore> {
        let store = InMemoryArrayStore::new();
        for values in arrays {
            store.insert(values, false).await?;
        }
        Ok(store)
    }

    /// Create a store holding `count` random arrays.
    pub async fn random_store(count: usize) -> SortboxResult<InMemoryArrayStore> {
        let store = InMemoryArrayStore::new();
        for _ in 0..count {
            store.insert(&random_values(), false).await?;
        }
        Ok(store)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for SORTBOX-specific validation.

    use super::*;

    /// Assert that record ids form the range `1..=N`.
    #[track_caller]
    pub fn assert_contiguous(records: &[ArrayRecord]) {
        let ids: Vec<ArrayId> = records.iter().map(|r| r.id).collect();
        assert!(ids_are_contiguous(&ids), "Expected ids 1..={}, got {:?}", ids.len(), ids);
    }

    /// Assert that a slice is in non-decreasing order.
    #[track_caller]
    pub fn assert_non_decreasing(values: &[i64]) {
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "Expected non-decreasing values, got {:?}",
            values
        );
    }

    /// Assert that a SortboxResult is a NotFound storage error for `id`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &SortboxResult<T>, id: ArrayId) {
        match result {
            Err(SortboxError::Storage(StorageError::NotFound { id: missing })) => {
                assert_eq!(*missing, id, "Wrong id in NotFound error");
            }
            other => panic!("Expected NotFound for id {}, got: {:?}", id, other),
        }
    }

    /// Assert that a SortboxResult is a parse error.
    #[track_caller]
    pub fn assert_parse_error<T: std::fmt::Debug>(result: &SortboxResult<T>) {
        match result {
            Err(SortboxError::Parse(_)) => {}
            other => panic!("Expected Parse error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_random_values_bounds() {
        for _ in 0..50 {
            let values = random_values();
            assert!((RANDOM_MIN_LEN..=RANDOM_MAX_LEN).contains(&values.len()));
            assert!(values
                .iter()
                .all(|v| (RANDOM_MIN_VALUE..RANDOM_MAX_VALUE).contains(v)));
        }
    }

    #[test]
    fn test_random_array_string_parses() {
        let text = random_array_string();
        assert!(parse_array(&text).is_ok());
    }

    #[tokio::test]
    async fn test_seeded_store() -> SortboxResult<()> {
        let store = seeded_store(&[&[3, 1, 2], &[9]]).await?;
        let records = store.list().await?;
        assert_eq!(records.len(), 2);
        assert_contiguous(&records);
        assert_eq!(records[1].data, vec![9]);
        assert_not_found(&store.load(3).await, 3);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_array_text_parses_to_values((text, values) in arb_array_text()) {
            prop_assert_eq!(parse_array(&text).ok(), Some(values));
        }

        #[test]
        fn prop_invalid_token_rejected(token in arb_invalid_token()) {
            let text = format!("1,{},3", token);
            let is_invalid_token = matches!(parse_array(&text), Err(ParseError::InvalidToken { .. }));
            prop_assert!(is_invalid_token);
        }
    }
}
