//! Hashed TF-IDF vectorizer.
//!
//! Text is tokenized, expanded into n-grams, and each n-gram is hashed into
//! one of `hash_size` slots. Fitting accumulates raw counts per
//! `(slot, document)`; building turns them into weights
//!
//! ```text
//! tf(t, d)  = ln(1 + count(t, d))
//! idf(t)    = max(0, ln((N - df(t) + 0.5) / (df(t) + 0.5)))
//! w(t, d)   = tf(t, d) * idf(t)
//! ```
//!
//! where `N` is the number of documents and `df(t)` the number of documents
//! with a nonzero count in slot `t`. Queries get the same weighting and are
//! L2-normalized.

use crate::config::VectorizerConfig;
use crate::error::FitError;
use crate::sparse::{CsrMatrix, SparseVector};
use crate::storage::{load_index, save_index};
use crate::vectorizer::hashing::hash_term;
use crate::vectorizer::tokenizer::tokenize;
use crate::vectorizer::{IndexOptions, Vectorizer};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;

/// BM25-style inverse document frequency, clipped at zero.
pub fn idf(num_docs: usize, doc_freq: u32) -> f32 {
    let n = num_docs as f32;
    let df = doc_freq as f32;
    ((n - df + 0.5) / (df + 0.5)).ln().max(0.0)
}

/// Hashing TF-IDF vectorizer backed by a persisted index file.
#[derive(Debug)]
pub struct HashingTfIdfVectorizer {
    config: VectorizerConfig,
    /// Live corpus statistics and hyperparameters.
    options: IndexOptions,
    matrix: Option<Arc<CsrMatrix>>,
    /// Fitted `(slot, column, count)` triplets awaiting `build_index`.
    counts: Vec<(u32, u32, f32)>,
    fitted: HashSet<u32>,
}

impl HashingTfIdfVectorizer {
    /// Creates an unfitted vectorizer. Fails if the hyperparameters are invalid.
    pub fn new(config: VectorizerConfig) -> Result<Self, FitError> {
        config.validate().map_err(FitError::InvalidConfig)?;
        let options = IndexOptions {
            ngram_range: config.ngram_range,
            hash_size: config.hash_size,
            ..IndexOptions::default()
        };
        Ok(Self {
            config,
            options,
            matrix: None,
            counts: Vec::new(),
            fitted: HashSet::new(),
        })
    }

    /// The configuration this vectorizer was created with.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Current number of hashed term slots.
    pub fn hash_size(&self) -> u32 {
        self.options.hash_size
    }

    /// Current n-gram range.
    pub fn ngram_range(&self) -> (usize, usize) {
        self.options.ngram_range
    }

    /// Current doc2index mapping.
    pub fn doc2index(&self) -> &HashMap<String, u32> {
        &self.options.doc2index
    }

    /// Current per-slot document frequencies.
    pub fn term_freqs(&self) -> &[u32] {
        &self.options.term_freqs
    }

    /// Slot indices of every n-gram in `text`, with repetitions.
    fn hashes(&self, text: &str) -> Vec<u32> {
        let hash_size = self.options.hash_size;
        tokenize(text)
            .ngrams(self.options.ngram_range)
            .iter()
            .map(|gram| hash_term(gram, hash_size))
            .collect()
    }
}

impl Vectorizer for HashingTfIdfVectorizer {
    fn vectorize(&self, text: &str) -> SparseVector {
        let hash_size = self.options.hash_size;
        let num_docs = self.options.doc2index.len();
        let freqs = &self.options.term_freqs;
        if num_docs == 0 || freqs.len() != hash_size as usize {
            return SparseVector::empty(hash_size);
        }

        SparseVector::from_counts(hash_size, self.hashes(text))
            .map_values(|slot, count| count.ln_1p() * idf(num_docs, freqs[slot as usize]))
            .normalized()
    }

    fn artifact_exists(&self) -> bool {
        self.config.index_path.exists()
    }

    fn load(&mut self) -> io::Result<(Arc<CsrMatrix>, IndexOptions)> {
        let artifact = load_index(&self.config.index_path)?;
        let matrix = Arc::new(artifact.matrix);
        self.matrix = Some(Arc::clone(&matrix));
        self.options.ngram_range = artifact.options.ngram_range;
        self.counts.clear();
        self.fitted.clear();
        Ok((matrix, artifact.options))
    }

    fn save(&self) -> io::Result<()> {
        let matrix = self.matrix.as_ref().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "nothing to save: vectorizer has no built or loaded index",
            )
        })?;
        save_index(&self.config.index_path, matrix, &self.options)
    }

    fn set_doc2index(&mut self, doc2index: HashMap<String, u32>) -> Result<(), FitError> {
        let len = doc2index.len();
        {
            let mut owners: HashMap<u32, &str> = HashMap::with_capacity(len);
            for (id, &pos) in &doc2index {
                if pos as usize >= len {
                    return Err(FitError::PositionOutOfRange {
                        id: id.clone(),
                        position: pos,
                        len,
                    });
                }
                if let Some(other) = owners.insert(pos, id.as_str()) {
                    return Err(FitError::PositionConflict {
                        position: pos,
                        first: other.to_string(),
                        second: id.clone(),
                    });
                }
            }
        }

        self.options = IndexOptions {
            ngram_range: self.config.ngram_range,
            hash_size: self.config.hash_size,
            term_freqs: Vec::new(),
            doc2index,
        };
        self.matrix = None;
        self.counts.clear();
        self.fitted.clear();
        Ok(())
    }

    fn fit_batch(&mut self, documents: &[String], ids: &[String]) -> Result<(), FitError> {
        if documents.len() != ids.len() {
            return Err(FitError::BatchShape {
                documents: documents.len(),
                ids: ids.len(),
            });
        }

        for (text, id) in documents.iter().zip(ids) {
            let col = *self
                .options
                .doc2index
                .get(id)
                .ok_or_else(|| FitError::UnknownIdentifier(id.clone()))?;
            if !self.fitted.insert(col) {
                return Err(FitError::IdentifierCollision(id.clone()));
            }

            let doc = SparseVector::from_counts(self.options.hash_size, self.hashes(text));
            self.counts
                .extend(doc.iter().map(|(slot, count)| (slot, col, count)));
        }
        Ok(())
    }

    fn build_index(&mut self) -> Result<(Arc<CsrMatrix>, IndexOptions), FitError> {
        let num_docs = self.options.doc2index.len();
        if num_docs == 0 {
            return Err(FitError::EmptyCorpus);
        }
        if self.fitted.is_empty() {
            return Err(FitError::NotFitted);
        }
        if self.fitted.len() < num_docs {
            tracing::warn!(
                "{} of {} declared documents were never fitted",
                num_docs - self.fitted.len(),
                num_docs
            );
        }

        let hash_size = self.options.hash_size;
        let counts = CsrMatrix::from_triplets(
            hash_size,
            num_docs as u32,
            std::mem::take(&mut self.counts),
        );
        let term_freqs: Vec<u32> = (0..hash_size).map(|slot| counts.row_nnz(slot) as u32).collect();
        let matrix = counts.map_entries(|slot, _, count| {
            count.ln_1p() * idf(num_docs, term_freqs[slot as usize])
        });
        self.fitted.clear();

        tracing::info!(
            "Built TF-IDF matrix: {} documents, {} slots, {} nonzeros",
            num_docs,
            hash_size,
            matrix.nnz()
        );

        let matrix = Arc::new(matrix);
        self.matrix = Some(Arc::clone(&matrix));
        let options = IndexOptions {
            ngram_range: self.options.ngram_range,
            hash_size,
            term_freqs,
            doc2index: std::mem::take(&mut self.options.doc2index),
        };
        Ok((matrix, options))
    }

    fn reconfigure(
        &mut self,
        doc2index: HashMap<String, u32>,
        term_freqs: Vec<u32>,
        hash_size: u32,
    ) -> Result<(), FitError> {
        if term_freqs.len() != hash_size as usize {
            return Err(FitError::HashSizeMismatch {
                expected: hash_size,
                actual: term_freqs.len(),
            });
        }
        self.options.doc2index = doc2index;
        self.options.term_freqs = term_freqs;
        self.options.hash_size = hash_size;
        Ok(())
    }
}
