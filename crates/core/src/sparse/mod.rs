//! Sparse linear algebra over the hashed term space.
//!
//! [`SparseVector`] represents a query (or any single row), [`CsrMatrix`] the
//! term-document matrix. Scoring a query is a single sparse vector-matrix product.

/// Compressed sparse row term-document matrix.
pub mod matrix;
/// Sorted-index sparse vector and the vector-matrix product.
pub mod vector;

pub use matrix::CsrMatrix;
pub use vector::SparseVector;
