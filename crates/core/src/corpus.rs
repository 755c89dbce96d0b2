//! Training corpora streamed to a vectorizer in batches.
//!
//! A [`BatchSource`] declares the full doc2index mapping up front and then
//! yields `(documents, identifiers)` batches. [`CorpusIterator`] is the
//! in-memory implementation, built from pairs or from a JSONL file with one
//! `{"id": ..., "text": ...}` record per line.

use crate::config;
use crate::error::{CorpusError, FitError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One batch of raw documents with their external identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Raw document texts.
    pub documents: &'a [String],
    /// Identifiers, parallel to `documents`.
    pub ids: &'a [String],
}

/// Source of training batches.
pub trait BatchSource {
    /// External id → column position for every document the source will yield.
    fn doc2index(&self) -> &HashMap<String, u32>;

    /// Lazily yields the corpus in batches. Each call restarts from the beginning.
    fn batches(&self) -> Box<dyn Iterator<Item = Batch<'_>> + '_>;
}

#[derive(Deserialize)]
struct CorpusRecord {
    id: String,
    #[serde(default)]
    title: Option<String>,
    text: String,
}

/// In-memory corpus yielding fixed-size batches.
#[derive(Debug, Clone)]
pub struct CorpusIterator {
    ids: Vec<String>,
    texts: Vec<String>,
    doc2index: HashMap<String, u32>,
    batch_size: usize,
}

impl CorpusIterator {
    /// Builds a corpus from `(id, text)` pairs. Positions follow input order.
    pub fn from_documents<I, S, T>(documents: I, batch_size: usize) -> Result<Self, FitError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut ids = Vec::new();
        let mut texts = Vec::new();
        let mut doc2index = HashMap::new();
        for (id, text) in documents {
            let id = id.into();
            if doc2index.contains_key(&id) {
                return Err(FitError::IdentifierCollision(id));
            }
            doc2index.insert(id.clone(), ids.len() as u32);
            ids.push(id);
            texts.push(text.into());
        }
        Ok(Self {
            ids,
            texts,
            doc2index,
            batch_size: batch_size.max(1),
        })
    }

    /// Reads a JSONL corpus. A record's optional `title` is prepended to its text.
    /// Blank lines are skipped.
    pub fn from_jsonl(path: &Path, batch_size: usize) -> Result<Self, CorpusError> {
        let reader = BufReader::new(File::open(path)?);
        let mut pairs = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: CorpusRecord = serde_json::from_str(&line)
                .map_err(|source| CorpusError::Parse { line: i + 1, source })?;
            let text = match record.title {
                Some(title) if !title.is_empty() => format!("{}\n{}", title, record.text),
                _ => record.text,
            };
            pairs.push((record.id, text));
        }
        tracing::info!("Read {} documents from {:?}", pairs.len(), path);
        Ok(Self::from_documents(pairs, batch_size)?)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Documents per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for CorpusIterator {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            texts: Vec::new(),
            doc2index: HashMap::new(),
            batch_size: config::DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchSource for CorpusIterator {
    fn doc2index(&self) -> &HashMap<String, u32> {
        &self.doc2index
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<'_>> + '_> {
        Box::new(
            self.texts
                .chunks(self.batch_size)
                .zip(self.ids.chunks(self.batch_size))
                .map(|(documents, ids)| Batch { documents, ids }),
        )
    }
}
