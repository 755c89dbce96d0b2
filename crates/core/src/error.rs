//! Error types for ranking, fitting, and persistence.

use std::io;

/// Errors raised while fitting a vectorizer or reconfiguring it after load.
#[derive(thiserror::Error, Debug)]
pub enum FitError {
    /// A batch carried a different number of documents and identifiers.
    #[error("malformed batch: {documents} documents but {ids} identifiers")]
    BatchShape {
        /// Number of documents in the batch.
        documents: usize,
        /// Number of identifiers in the batch.
        ids: usize,
    },
    /// A batch referenced an identifier missing from the declared doc2index.
    #[error("identifier '{0}' is not declared in doc2index")]
    UnknownIdentifier(String),
    /// The same identifier was fitted (or declared) twice.
    #[error("identifier '{0}' appears more than once")]
    IdentifierCollision(String),
    /// A declared position lies outside `0..len`.
    #[error("identifier '{id}' maps to position {position}, corpus has {len} documents")]
    PositionOutOfRange {
        /// Identifier carrying the bad position.
        id: String,
        /// Declared position.
        position: u32,
        /// Number of declared documents.
        len: usize,
    },
    /// Two identifiers were declared at the same position.
    #[error("position {position} is declared for both '{first}' and '{second}'")]
    PositionConflict {
        /// Shared position.
        position: u32,
        /// First identifier seen at the position.
        first: String,
        /// Second identifier seen at the position.
        second: String,
    },
    /// `term_freqs` length disagrees with the hashed term space.
    #[error("term_freqs has {actual} entries, hash_size is {expected}")]
    HashSizeMismatch {
        /// Configured hash size.
        expected: u32,
        /// Length of the supplied frequencies.
        actual: usize,
    },
    /// No documents were fitted before building the index.
    #[error("nothing has been fitted")]
    NotFitted,
    /// The declared doc2index is empty.
    #[error("corpus declares no documents")]
    EmptyCorpus,
    /// Hyperparameters were rejected.
    #[error("invalid vectorizer configuration: {0}")]
    InvalidConfig(String),
}

/// Errors surfaced by the [`Ranker`](crate::ranker::Ranker).
#[derive(thiserror::Error, Debug)]
pub enum RankerError {
    /// Query or save attempted before a successful load or fit.
    #[error("ranker is not initialized; load an index or fit one first")]
    NotReady,
    /// A matrix column has no external identifier. The doc2index mapping and
    /// the matrix were built inconsistently.
    #[error("corrupt index: column {position} has no document identifier")]
    CorruptIndex {
        /// Offending column position.
        position: u32,
    },
    /// Failure propagated unchanged from the vectorizer or training iterator.
    #[error(transparent)]
    Fit(#[from] FitError),
    /// The index artifact exists but could not be read, or could not be written.
    #[error("persistence error: {0}")]
    Persistence(#[from] io::Error),
}

/// Errors raised while reading a training corpus.
#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    /// The corpus file could not be read.
    #[error("failed to read corpus: {0}")]
    Io(#[from] io::Error),
    /// A JSONL line is not a valid corpus record.
    #[error("invalid corpus record on line {line}: {source}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The corpus declares an identifier twice.
    #[error(transparent)]
    Fit(#[from] FitError),
}
