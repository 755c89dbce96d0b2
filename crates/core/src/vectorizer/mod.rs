//! Query vectorization and the fitted term-document state behind it.
//!
//! A [`Vectorizer`] maps query text into the hashed term space and owns the
//! fitted matrix, the global term frequencies, and the doc2index mapping.
//! [`HashingTfIdfVectorizer`] is the concrete hashed TF-IDF implementation.

/// Stable term hashing into a fixed number of slots.
pub mod hashing;
/// Hashed TF-IDF vectorizer with incremental fitting and persistence.
pub mod tfidf;
/// Tokenizer with stop word filtering and n-gram generation.
pub mod tokenizer;

pub use hashing::hash_term;
pub use tfidf::HashingTfIdfVectorizer;

use crate::error::FitError;
use crate::sparse::{CsrMatrix, SparseVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

/// Everything besides the matrix needed to make an index query-ready.
///
/// Produced once by fitting, persisted next to the matrix, and read back
/// verbatim on load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Inclusive n-gram range used when hashing text.
    pub ngram_range: (usize, usize),
    /// Number of hashed term slots (matrix rows).
    pub hash_size: u32,
    /// Per-slot document frequency, length `hash_size`.
    pub term_freqs: Vec<u32>,
    /// External document id → matrix column.
    pub doc2index: HashMap<String, u32>,
}

/// Capability the [`Ranker`](crate::ranker::Ranker) needs from a vectorizer.
pub trait Vectorizer {
    /// Maps text to a sparse row vector over the hashed term space.
    ///
    /// Deterministic for a fixed hashing scheme and fitted state.
    fn vectorize(&self, text: &str) -> SparseVector;

    /// Whether a persisted index exists at the configured location.
    fn artifact_exists(&self) -> bool;

    /// Reads the persisted matrix and options.
    ///
    /// The vectorizer keeps a shared handle to the matrix so a later
    /// [`save`](Self::save) can rewrite it. Term statistics and doc2index are
    /// installed separately through [`reconfigure`](Self::reconfigure).
    fn load(&mut self) -> io::Result<(Arc<CsrMatrix>, IndexOptions)>;

    /// Writes the current matrix, frequencies, doc2index, and hyperparameters,
    /// replacing any prior artifact.
    fn save(&self) -> io::Result<()>;

    /// Starts a fit over the corpus declared by `doc2index`, discarding any
    /// previously fitted or loaded state.
    fn set_doc2index(&mut self, doc2index: HashMap<String, u32>) -> Result<(), FitError>;

    /// Incrementally accumulates term counts for one batch of documents.
    fn fit_batch(&mut self, documents: &[String], ids: &[String]) -> Result<(), FitError>;

    /// Turns the accumulated counts into the weighted matrix.
    ///
    /// Ownership of the term frequencies and doc2index moves into the returned
    /// options; hand them back with [`reconfigure`](Self::reconfigure).
    fn build_index(&mut self) -> Result<(Arc<CsrMatrix>, IndexOptions), FitError>;

    /// Installs corpus statistics after a load or build, making the
    /// vectorizer query-ready in one step.
    fn reconfigure(
        &mut self,
        doc2index: HashMap<String, u32>,
        term_freqs: Vec<u32>,
        hash_size: u32,
    ) -> Result<(), FitError>;
}
