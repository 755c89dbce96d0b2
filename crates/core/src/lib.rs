//! # docrank-core
//!
//! Retrieval core of a document ranker: scores a fixed corpus against a query
//! by hashed TF-IDF similarity and returns the top-n documents with scores.
//!
//! ```text
//! query text → Vectorizer (tokenize → n-grams → hash → tf-idf) → SparseVector
//!            → SparseVector × CsrMatrix (terms × documents) → scores
//!            → top-n selection → index2doc → Ranking
//! Persistence: CsrMatrix + IndexOptions → bincode + CRC32 footer (atomic rename)
//! ```
//!
//! This crate has no async dependencies. All operations are synchronous and
//! run to completion.

/// Global configuration constants and vectorizer settings.
pub mod config;
/// Training corpora and the batch iterator contract.
pub mod corpus;
/// Error types.
pub mod error;
/// Ranker: index loading, query scoring, fit delegation, and persistence.
pub mod ranker;
/// Search primitives: top-n selection and ranked results.
pub mod search;
/// Sparse vector and CSR matrix.
pub mod sparse;
/// Storage layer: index artifact save/load.
pub mod storage;
/// Vectorizer contract and the hashed TF-IDF implementation.
pub mod vectorizer;

pub use config::VectorizerConfig;
pub use corpus::{Batch, BatchSource, CorpusIterator};
pub use error::{CorpusError, FitError, RankerError};
pub use ranker::Ranker;
pub use search::Ranking;
pub use sparse::{CsrMatrix, SparseVector};
pub use vectorizer::{HashingTfIdfVectorizer, IndexOptions, Vectorizer};
