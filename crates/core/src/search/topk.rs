//! Adaptive top-n selection over materialized scores.
//!
//! When every candidate fits in the result, the candidates are sorted outright.
//! Otherwise a linear-time partial selection isolates the `n` best entries and
//! only that prefix is sorted, so a query touching tens of thousands of
//! documents pays `O(m + n log n)` instead of `O(m log m)`.
//!
//! Ordering among exactly equal scores is implementation-defined: both the
//! selection and the sort are unstable, and no secondary key is applied.
//! Callers must not rely on the relative order of tied documents.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Returns the `n` highest-scoring `(column, score)` entries, ordered by
/// descending score. The result has length `min(n, entries.len())`.
pub fn select_top_n(mut entries: Vec<(u32, f32)>, n: usize) -> Vec<(u32, f32)> {
    if n == 0 || entries.is_empty() {
        return Vec::new();
    }

    if entries.len() > n {
        entries.select_nth_unstable_by_key(n - 1, |&(_, score)| Reverse(OrderedFloat(score)));
        entries.truncate(n);
    }
    entries.sort_unstable_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
    entries
}
