//! Ranked query results.

use serde::Serialize;

/// Result of a single query: parallel sequences of document identifiers and
/// scores, ordered by descending score.
///
/// Documents with exactly equal scores appear in an implementation-defined order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// External document identifiers.
    pub doc_ids: Vec<String>,
    /// Similarity scores, parallel to `doc_ids`.
    pub scores: Vec<f32>,
}

impl Ranking {
    /// Number of ranked documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Returns `true` if no document matched.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Iterates `(doc_id, score)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.doc_ids
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }
}
