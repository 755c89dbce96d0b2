//! Compressed sparse row matrix holding the term-document weights.
//!
//! Rows are hashed term slots and columns are documents, so row `t` is the
//! postings list of slot `t`: every `(document, weight)` pair with a nonzero
//! weight for that slot.

use serde::{Deserialize, Serialize};

/// Term-document matrix in CSR layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CsrMatrix {
    rows: u32,
    cols: u32,
    /// `indptr[r]..indptr[r + 1]` delimits row `r` in `indices` / `data`.
    indptr: Vec<u64>,
    /// Column (document) ids, ascending within a row.
    indices: Vec<u32>,
    data: Vec<f32>,
}

impl CsrMatrix {
    /// Creates an all-zero matrix.
    pub fn zeros(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            indptr: vec![0; rows as usize + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Builds a matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate coordinates are summed, entries that end up zero are dropped,
    /// and triplets outside the shape are ignored.
    pub fn from_triplets(
        rows: u32,
        cols: u32,
        triplets: impl IntoIterator<Item = (u32, u32, f32)>,
    ) -> Self {
        let mut entries: Vec<(u32, u32, f32)> = triplets
            .into_iter()
            .filter(|&(r, c, _)| r < rows && c < cols)
            .collect();
        entries.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut merged: Vec<(u32, u32, f32)> = Vec::with_capacity(entries.len());
        for (r, c, v) in entries {
            if let Some(last) = merged.last_mut() {
                if last.0 == r && last.1 == c {
                    last.2 += v;
                    continue;
                }
            }
            merged.push((r, c, v));
        }
        merged.retain(|&(_, _, v)| v != 0.0);

        let mut indptr = vec![0u64; rows as usize + 1];
        for &(r, _, _) in &merged {
            indptr[r as usize + 1] += 1;
        }
        for i in 0..rows as usize {
            indptr[i + 1] += indptr[i];
        }
        let indices = merged.iter().map(|&(_, c, _)| c).collect();
        let data = merged.iter().map(|&(_, _, v)| v).collect();

        Self {
            rows,
            cols,
            indptr,
            indices,
            data,
        }
    }

    /// Number of rows (hashed term slots).
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns (documents).
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    fn row_bounds(&self, row: u32) -> (usize, usize) {
        if row >= self.rows {
            return (0, 0);
        }
        let r = row as usize;
        (self.indptr[r] as usize, self.indptr[r + 1] as usize)
    }

    /// Stored `(col, value)` pairs of `row`. Empty for out-of-range rows.
    pub fn row(&self, row: u32) -> impl Iterator<Item = (u32, f32)> + '_ {
        let (start, end) = self.row_bounds(row);
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.data[start..end].iter().copied())
    }

    /// Number of stored entries in `row`.
    pub fn row_nnz(&self, row: u32) -> usize {
        let (start, end) = self.row_bounds(row);
        end - start
    }

    /// Iterates every stored `(row, col, value)` triplet in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        (0..self.rows).flat_map(move |r| self.row(r).map(move |(c, v)| (r, c, v)))
    }

    /// Applies `f(row, col, value)` to every entry, dropping results equal to zero.
    pub fn map_entries(&self, mut f: impl FnMut(u32, u32, f32) -> f32) -> Self {
        let mapped: Vec<(u32, u32, f32)> =
            self.iter().map(|(r, c, v)| (r, c, f(r, c, v))).collect();
        Self::from_triplets(self.rows, self.cols, mapped)
    }

    /// Validate structural invariants, typically after deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if self.indptr.len() != self.rows as usize + 1 {
            return Err(format!(
                "indptr length {} != rows + 1 ({})",
                self.indptr.len(),
                self.rows as usize + 1
            ));
        }
        if self.indices.len() != self.data.len() {
            return Err(format!(
                "indices length {} != data length {}",
                self.indices.len(),
                self.data.len()
            ));
        }
        if self.indptr[0] != 0 || self.indptr[self.rows as usize] as usize != self.data.len() {
            return Err("indptr does not span the stored entries".to_string());
        }
        for r in 0..self.rows as usize {
            let (start, end) = (self.indptr[r], self.indptr[r + 1]);
            if start > end || end as usize > self.indices.len() {
                return Err(format!("indptr out of order at row {}", r));
            }
            let cols = &self.indices[start as usize..end as usize];
            if let Some(&c) = cols.iter().find(|&&c| c >= self.cols) {
                return Err(format!("row {} references column {} >= {}", r, c, self.cols));
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("row {} columns are not strictly increasing", r));
            }
        }
        if let Some(pos) = self.data.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite weight at entry {}", pos));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        CsrMatrix::from_triplets(
            5,
            3,
            [(2, 1, 1.0), (1, 0, 1.0), (2, 0, 1.0), (3, 1, 1.0), (4, 2, 1.0)],
        )
    }

    #[test]
    fn test_from_triplets_layout() {
        let m = sample();
        assert_eq!(m.rows(), 5);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.nnz(), 5);
        assert_eq!(m.row(2).collect::<Vec<_>>(), vec![(0, 1.0), (1, 1.0)]);
        assert_eq!(m.row(0).count(), 0);
        assert_eq!(m.row_nnz(2), 2);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_duplicates_summed_and_zeros_dropped() {
        let m = CsrMatrix::from_triplets(2, 2, [(0, 1, 1.0), (0, 1, 2.0), (1, 0, 0.0)]);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(1, 3.0)]);
    }

    #[test]
    fn test_out_of_range_row_is_empty() {
        let m = sample();
        assert_eq!(m.row(99).count(), 0);
        assert_eq!(m.row_nnz(99), 0);
    }

    #[test]
    fn test_map_entries() {
        let m = sample().map_entries(|r, _, v| if r == 2 { 0.0 } else { v * 2.0 });
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row(1).collect::<Vec<_>>(), vec![(0, 2.0)]);
    }

    #[test]
    fn test_validate_detects_bad_column() {
        let mut m = sample();
        m.indices[0] = 7;
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_validate_detects_truncated_indptr() {
        let mut m = sample();
        m.indptr.pop();
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_zeros() {
        let m = CsrMatrix::zeros(4, 0);
        assert_eq!(m.nnz(), 0);
        assert!(m.validate().is_ok());
    }
}
