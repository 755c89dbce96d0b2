//! Configuration for docrank.
//!
//! Tuning parameters and defaults are compile-time constants. Runtime
//! configuration of a vectorizer is carried by [`VectorizerConfig`]; the CLI
//! overrides individual fields from command-line arguments.

use std::path::PathBuf;

/// Default size of the hashed term space (2^24 slots).
///
/// Larger values reduce hash collisions between distinct n-grams at the cost
/// of a bigger `term_freqs` vector and matrix row pointer array.
pub const DEFAULT_HASH_SIZE: u32 = 1 << 24;

/// Default n-gram range `(min, max)`, inclusive on both ends.
pub const DEFAULT_NGRAM_RANGE: (usize, usize) = (1, 2);

/// Largest n-gram order accepted by [`VectorizerConfig::validate`].
pub const MAX_NGRAM: usize = 5;

/// Default number of documents returned by a query.
pub const DEFAULT_TOP_N: usize = 5;

/// Default number of documents per training batch.
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Default file name of a persisted index.
pub const DEFAULT_INDEX_FILE: &str = "tfidf.idx";

/// Default directory holding persisted indexes.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Settings for a hashing TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorizerConfig {
    /// Location of the persisted index. Used both for loading and saving.
    pub index_path: PathBuf,
    /// Number of hashed term slots.
    pub hash_size: u32,
    /// Inclusive n-gram range `(min, max)`.
    pub ngram_range: (usize, usize),
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_DATA_DIR).join(DEFAULT_INDEX_FILE),
            hash_size: DEFAULT_HASH_SIZE,
            ngram_range: DEFAULT_NGRAM_RANGE,
        }
    }
}

impl VectorizerConfig {
    /// Creates a configuration with default hyperparameters at the given index path.
    pub fn at(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            ..Self::default()
        }
    }

    /// Check hyperparameters before fitting.
    pub fn validate(&self) -> Result<(), String> {
        if self.hash_size == 0 {
            return Err("hash_size must be > 0".to_string());
        }
        let (min, max) = self.ngram_range;
        if min == 0 || min > max {
            return Err(format!(
                "invalid ngram_range ({}, {}): expected 1 <= min <= max",
                min, max
            ));
        }
        if max > MAX_NGRAM {
            return Err(format!("ngram_range max {} exceeds {}", max, MAX_NGRAM));
        }
        Ok(())
    }
}
