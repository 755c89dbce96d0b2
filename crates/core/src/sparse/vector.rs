//! Sparse vector over the hashed term space.

use crate::sparse::matrix::CsrMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sparse row vector: strictly increasing `indices` in `[0, dim)` with
/// parallel `values`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    dim: u32,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Creates an empty vector of dimension `dim`.
    pub fn empty(dim: u32) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a vector from `(index, weight)` pairs.
    ///
    /// Duplicate indices are summed, zero weights are dropped, and indices
    /// outside `[0, dim)` are discarded.
    pub fn from_pairs(dim: u32, pairs: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let mut acc: HashMap<u32, f32> = HashMap::new();
        for (idx, w) in pairs {
            if idx < dim {
                *acc.entry(idx).or_insert(0.0) += w;
            }
        }
        let mut entries: Vec<(u32, f32)> = acc.into_iter().filter(|&(_, w)| w != 0.0).collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);
        let (indices, values) = entries.into_iter().unzip();
        Self {
            dim,
            indices,
            values,
        }
    }

    /// Builds a vector of occurrence counts from a stream of indices.
    pub fn from_counts(dim: u32, hashes: impl IntoIterator<Item = u32>) -> Self {
        Self::from_pairs(dim, hashes.into_iter().map(|h| (h, 1.0)))
    }

    /// Dimension of the vector (the hash size).
    pub fn dim(&self) -> u32 {
        self.dim
    }

    /// Number of stored (nonzero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the vector stores no entries.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Stored indices in ascending order.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Stored values, parallel to [`indices`](Self::indices).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Weight at `index`, or 0.0 if absent.
    pub fn get(&self, index: u32) -> f32 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Iterates `(index, weight)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Applies `f` to every stored value, dropping entries that become zero.
    pub fn map_values(self, mut f: impl FnMut(u32, f32) -> f32) -> Self {
        let dim = self.dim;
        let mut indices = Vec::with_capacity(self.indices.len());
        let mut values = Vec::with_capacity(self.values.len());
        for (idx, w) in self.indices.into_iter().zip(self.values) {
            let v = f(idx, w);
            if v != 0.0 {
                indices.push(idx);
                values.push(v);
            }
        }
        Self {
            dim,
            indices,
            values,
        }
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Scales to unit L2 norm. A zero vector is returned unchanged.
    pub fn normalized(self) -> Self {
        let norm = self.l2_norm();
        if norm == 0.0 {
            return self;
        }
        self.map_values(|_, w| w / norm)
    }

    /// Sparse product `self (1 x rows) * matrix (rows x cols)`.
    ///
    /// For every column sharing at least one nonzero slot with `self`, the
    /// score is the sum of `query_weight * doc_weight` over the shared slots.
    /// Columns whose sum is exactly zero are not materialized. Entries are
    /// returned in ascending column order.
    pub fn dot_matrix(&self, matrix: &CsrMatrix) -> Vec<(u32, f32)> {
        let mut sums: HashMap<u32, f32> = HashMap::with_capacity(256);
        for (row, qw) in self.iter() {
            for (col, dw) in matrix.row(row) {
                *sums.entry(col).or_insert(0.0) += qw * dw;
            }
        }
        let mut scores: Vec<(u32, f32)> = sums.into_iter().filter(|&(_, s)| s != 0.0).collect();
        scores.sort_unstable_by_key(|&(col, _)| col);
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts_sums_duplicates() {
        let v = SparseVector::from_counts(10, [3, 1, 3, 3]);
        assert_eq!(v.indices(), &[1, 3]);
        assert_eq!(v.values(), &[1.0, 3.0]);
        assert_eq!(v.get(3), 3.0);
        assert_eq!(v.get(2), 0.0);
    }

    #[test]
    fn test_from_pairs_drops_zero_and_out_of_range() {
        let v = SparseVector::from_pairs(4, [(0, 0.0), (1, 2.0), (9, 1.0), (2, 1.0), (2, -1.0)]);
        assert_eq!(v.nnz(), 1);
        assert_eq!(v.get(1), 2.0);
    }

    #[test]
    fn test_normalized_unit_norm() {
        let v = SparseVector::from_pairs(8, [(1, 3.0), (5, 4.0)]).normalized();
        assert!((v.l2_norm() - 1.0).abs() < 1e-6);
        assert!((v.get(1) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_zero_vector_unchanged() {
        let v = SparseVector::empty(8).normalized();
        assert!(v.is_empty());
        assert_eq!(v.dim(), 8);
    }

    #[test]
    fn test_dot_matrix_skips_non_overlapping_columns() {
        // rows = terms, cols = docs: A=[1,2], B=[2,3], C=[4]
        let m = CsrMatrix::from_triplets(
            5,
            3,
            [(1, 0, 1.0), (2, 0, 1.0), (2, 1, 1.0), (3, 1, 1.0), (4, 2, 1.0)],
        );
        let q = SparseVector::from_counts(5, [2]);
        assert_eq!(q.dot_matrix(&m), vec![(0, 1.0), (1, 1.0)]);

        let miss = SparseVector::from_counts(5, [0]);
        assert!(miss.dot_matrix(&m).is_empty());
    }

    #[test]
    fn test_dot_matrix_drops_cancelled_sums() {
        let m = CsrMatrix::from_triplets(3, 1, [(0, 0, 1.0), (1, 0, -1.0)]);
        let q = SparseVector::from_counts(3, [0, 1]);
        assert!(q.dot_matrix(&m).is_empty());
    }
}
