//! Selection sort.

/// Sort a slice ascending in place with selection sort.
///
/// Each pass selects the minimum of the unsorted suffix and swaps it into
/// position, so the sort performs O(n²) comparisons and at most `n - 1`
/// swaps. It is not stable.
pub fn selection_sort<T: Ord>(values: &mut [T]) {
    let n = values.len();
    if n < 2 {
        return;
    }

    for i in 0..n - 1 {
        let mut min_index = i;
        for j in (i + 1)..n {
            if values[j] < values[min_index] {
                min_index = j;
            }
        }
        if min_index != i {
            values.swap(i, min_index);
        }
    }
}

/// Owned variant of [`selection_sort`].
pub fn selection_sorted<T: Ord>(mut values: Vec<T>) -> Vec<T> {
    selection_sort(&mut values);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sort_basic() {
        assert_eq!(selection_sorted(vec![3, 1, 2]), vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_trivial_inputs() {
        let mut empty: Vec<i64> = vec![];
        selection_sort(&mut empty);
        assert!(empty.is_empty());

        assert_eq!(selection_sorted(vec![9]), vec![9]);
    }

    #[test]
    fn test_sort_negatives_and_duplicates() {
        assert_eq!(
            selection_sorted(vec![5, -3, 5, 0, -3, 12]),
            vec![-3, -3, 0, 5, 5, 12]
        );
    }

    #[test]
    fn test_sort_already_sorted_and_reversed() {
        assert_eq!(selection_sorted(vec![1, 2, 3, 4]), vec![1, 2, 3, 4]);
        assert_eq!(selection_sorted(vec![4, 3, 2, 1]), vec![1, 2, 3, 4]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Output is non-decreasing.
        #[test]
        fn prop_sorted_is_non_decreasing(values in prop::collection::vec(any::<i64>(), 0..100)) {
            let sorted = selection_sorted(values);
            prop_assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
        }

        /// Output is a permutation of the input.
        #[test]
        fn prop_sorted_is_permutation(values in prop::collection::vec(-50i64..50, 0..100)) {
            let mut expected = values.clone();
            expected.sort_unstable();
            prop_assert_eq!(selection_sorted(values), expected);
        }
    }
}
