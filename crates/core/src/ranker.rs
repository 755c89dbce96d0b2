//! Document ranker over a fitted hashed TF-IDF index.
//!
//! A [`Ranker`] wraps a [`Vectorizer`] and the query-time view of its index:
//! a shared handle to the term-document matrix plus the doc2index mapping and
//! its inverse. All operations go through one `RwLock`: queries take the read
//! lock, while load, fit, and save take the write lock, so fitting and
//! querying never overlap.

use crate::corpus::BatchSource;
use crate::error::RankerError;
use crate::search::{select_top_n, Ranking};
use crate::sparse::CsrMatrix;
use crate::vectorizer::{IndexOptions, Vectorizer};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// Query-time view of a loaded or freshly built index.
#[derive(Debug)]
pub(crate) struct LoadedIndex {
    matrix: Arc<CsrMatrix>,
    doc2index: HashMap<String, u32>,
    /// Column → external id. Rebuilt whenever doc2index changes.
    index2doc: HashMap<u32, String>,
    ngram_range: (usize, usize),
    hash_size: u32,
}

impl LoadedIndex {
    /// Builds the index view, deriving index2doc as the inverse of doc2index.
    ///
    /// Two identifiers sharing a column cannot be inverted and are reported as
    /// [`RankerError::CorruptIndex`].
    pub fn new(
        matrix: Arc<CsrMatrix>,
        doc2index: HashMap<String, u32>,
        ngram_range: (usize, usize),
        hash_size: u32,
    ) -> Result<Self, RankerError> {
        let mut index2doc = HashMap::with_capacity(doc2index.len());
        for (doc, &position) in &doc2index {
            if index2doc.insert(position, doc.clone()).is_some() {
                return Err(RankerError::CorruptIndex { position });
            }
        }
        Ok(Self {
            matrix,
            doc2index,
            index2doc,
            ngram_range,
            hash_size,
        })
    }

    /// Number of indexed documents.
    pub fn num_docs(&self) -> usize {
        self.doc2index.len()
    }

    /// Column of an external document id.
    pub fn doc_index(&self, doc_id: &str) -> Option<u32> {
        self.doc2index.get(doc_id).copied()
    }

    /// External document id of a column.
    pub fn doc_id(&self, position: u32) -> Option<&str> {
        self.index2doc.get(&position).map(String::as_str)
    }
}

#[derive(Debug)]
enum RankerState {
    /// No index yet: waiting for a fit, or a fit is being rebuilt.
    Uninitialized,
    Ready(LoadedIndex),
}

#[derive(Debug)]
struct Inner<V> {
    vectorizer: V,
    state: RankerState,
}

/// TF-IDF document ranker.
///
/// Returns the top-n documents by sparse dot product between the query vector
/// and each document column. Ordering among exactly tied scores is
/// implementation-defined and must not be relied upon.
#[derive(Debug)]
pub struct Ranker<V: Vectorizer> {
    inner: RwLock<Inner<V>>,
}

impl<V: Vectorizer> Ranker<V> {
    /// Creates an uninitialized ranker around `vectorizer` without touching disk.
    pub fn new(vectorizer: V) -> Self {
        Self {
            inner: RwLock::new(Inner {
                vectorizer,
                state: RankerState::Uninitialized,
            }),
        }
    }

    /// Creates a ranker and loads the vectorizer's persisted index if present.
    ///
    /// A missing artifact is not an error: the ranker starts uninitialized and
    /// waits for [`fit_batch`](Self::fit_batch). An artifact that exists but
    /// cannot be read is returned as [`RankerError::Persistence`].
    pub fn initialize(vectorizer: V) -> Result<Self, RankerError> {
        let ranker = Self::new(vectorizer);
        if !ranker.inner.read().vectorizer.artifact_exists() {
            tracing::warn!("Ranker wasn't initialized: no index found, waiting for training");
            return Ok(ranker);
        }
        ranker.load()?;
        Ok(ranker)
    }

    /// Reloads the persisted index, replacing the current one.
    ///
    /// If the artifact cannot be read, the current index stays in place. If it
    /// reads but cannot be installed, the ranker is left uninitialized.
    pub fn load(&self) -> Result<(), RankerError> {
        let mut inner = self.inner.write();
        let (matrix, options) = inner.vectorizer.load()?;
        if let Err(e) = install(&mut inner, matrix, options) {
            inner.state = RankerState::Uninitialized;
            return Err(e);
        }
        if let RankerState::Ready(index) = &inner.state {
            tracing::info!(
                "Ranker ready: {} documents, hash_size={}, ngram_range={:?}",
                index.num_docs(),
                index.hash_size,
                index.ngram_range
            );
        }
        Ok(())
    }

    /// Ranks documents against `question` and returns the top `n`.
    ///
    /// Only documents sharing at least one hashed term with the query are
    /// candidates. The result holds `min(n, candidates)` documents ordered by
    /// descending score; `n == 0` yields an empty ranking.
    pub fn rank(&self, question: &str, n: usize) -> Result<Ranking, RankerError> {
        let inner = self.inner.read();
        let index = match &inner.state {
            RankerState::Ready(index) => index,
            RankerState::Uninitialized => return Err(RankerError::NotReady),
        };
        if n == 0 {
            return Ok(Ranking::default());
        }

        let query = inner.vectorizer.vectorize(question);
        let scores = query.dot_matrix(&index.matrix);
        let candidates = scores.len();
        let top = select_top_n(scores, n);

        let mut ranking = Ranking {
            doc_ids: Vec::with_capacity(top.len()),
            scores: Vec::with_capacity(top.len()),
        };
        for (position, score) in top {
            let doc_id = index
                .index2doc
                .get(&position)
                .ok_or(RankerError::CorruptIndex { position })?;
            ranking.doc_ids.push(doc_id.clone());
            ranking.scores.push(score);
        }

        tracing::debug!(
            query_terms = query.nnz(),
            candidates,
            returned = ranking.len(),
            "ranked query"
        );
        Ok(ranking)
    }

    /// Ranks using the first of several query variants; the rest are ignored.
    ///
    /// An empty slice yields an empty ranking once the ranker is ready.
    pub fn rank_variants<S: AsRef<str>>(
        &self,
        questions: &[S],
        n: usize,
    ) -> Result<Ranking, RankerError> {
        match questions.first() {
            Some(question) => self.rank(question.as_ref(), n),
            None if self.is_ready() => Ok(Ranking::default()),
            None => Err(RankerError::NotReady),
        }
    }

    /// Fits the vectorizer on every batch of `source` and swaps in the new index.
    ///
    /// The ranker is uninitialized from the start of the fit until the new
    /// index is installed; a failed fit leaves it uninitialized. Errors from
    /// the vectorizer propagate unchanged.
    pub fn fit_batch<B: BatchSource + ?Sized>(&self, source: &B) -> Result<(), RankerError> {
        let mut inner = self.inner.write();
        inner.state = RankerState::Uninitialized;
        inner.vectorizer.set_doc2index(source.doc2index().clone())?;

        let mut batches = 0usize;
        for batch in source.batches() {
            inner.vectorizer.fit_batch(batch.documents, batch.ids)?;
            batches += 1;
        }

        let (matrix, options) = inner.vectorizer.build_index()?;
        install(&mut inner, matrix, options)?;
        tracing::info!("Fit complete: {} batches", batches);
        Ok(())
    }

    /// Persists the index through the vectorizer.
    pub fn save(&self) -> Result<(), RankerError> {
        let inner = self.inner.write();
        if !matches!(inner.state, RankerState::Ready(_)) {
            return Err(RankerError::NotReady);
        }
        inner.vectorizer.save()?;
        Ok(())
    }

    /// Returns `true` once an index has been loaded or fitted.
    pub fn is_ready(&self) -> bool {
        matches!(self.inner.read().state, RankerState::Ready(_))
    }

    /// Number of indexed documents, or `None` when uninitialized.
    pub fn num_docs(&self) -> Option<usize> {
        self.with_index(LoadedIndex::num_docs)
    }

    /// Hash size of the loaded index.
    pub fn hash_size(&self) -> Option<u32> {
        self.with_index(|index| index.hash_size)
    }

    /// N-gram range of the loaded index.
    pub fn ngram_range(&self) -> Option<(usize, usize)> {
        self.with_index(|index| index.ngram_range)
    }

    /// Stored entries in the loaded matrix.
    pub fn nnz(&self) -> Option<usize> {
        self.with_index(|index| index.matrix.nnz())
    }

    /// Column of an external document id.
    pub fn doc_index(&self, doc_id: &str) -> Option<u32> {
        self.with_index(|index| index.doc_index(doc_id)).flatten()
    }

    /// External document id of a column.
    pub fn doc_id(&self, position: u32) -> Option<String> {
        self.with_index(|index| index.doc_id(position).map(str::to_owned))
            .flatten()
    }

    /// Read access to the wrapped vectorizer.
    pub fn vectorizer(&self) -> MappedRwLockReadGuard<'_, V> {
        RwLockReadGuard::map(self.inner.read(), |inner| &inner.vectorizer)
    }

    fn with_index<R>(&self, f: impl FnOnce(&LoadedIndex) -> R) -> Option<R> {
        match &self.inner.read().state {
            RankerState::Ready(index) => Some(f(index)),
            RankerState::Uninitialized => None,
        }
    }
}

/// Propagates corpus statistics into the vectorizer and swaps in the query view.
fn install<V: Vectorizer>(
    inner: &mut Inner<V>,
    matrix: Arc<CsrMatrix>,
    options: IndexOptions,
) -> Result<(), RankerError> {
    let IndexOptions {
        ngram_range,
        hash_size,
        term_freqs,
        doc2index,
    } = options;
    let index = LoadedIndex::new(matrix, doc2index.clone(), ngram_range, hash_size)?;
    inner
        .vectorizer
        .reconfigure(doc2index, term_freqs, hash_size)?;
    inner.state = RankerState::Ready(index);
    Ok(())
}
