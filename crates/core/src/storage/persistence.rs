//! Disk persistence for fitted indexes using bincode serialization.
//!
//! An index is one file holding the bincode-encoded matrix and options,
//! followed by an 8-byte footer `[magic "DRK1"][u32 CRC32 BE]` over the payload.
//! Writes go to a temp file that is renamed over the target, so a crash never
//! leaves a half-written index in place.

use crate::sparse::CsrMatrix;
use crate::vectorizer::IndexOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Magic bytes preceding the CRC32 footer.
const INDEX_CRC_MAGIC: &[u8; 4] = b"DRK1";

#[derive(Serialize)]
struct IndexArtifactRef<'a> {
    matrix: &'a CsrMatrix,
    options: &'a IndexOptions,
}

/// Decoded contents of an index file.
#[derive(Debug, Deserialize)]
pub struct IndexArtifact {
    /// Weighted term-document matrix.
    pub matrix: CsrMatrix,
    /// Hyperparameters and corpus statistics.
    pub options: IndexOptions,
}

impl IndexArtifact {
    /// Validate cross-field invariants after deserialization.
    ///
    /// Checks the matrix structure, that the matrix and `term_freqs` span
    /// `hash_size` slots, and that doc2index maps bijectively onto the columns.
    pub fn validate(&self) -> Result<(), String> {
        self.matrix.validate()?;
        let opts = &self.options;
        if opts.hash_size == 0 {
            return Err("hash_size is 0".to_string());
        }
        if self.matrix.rows() != opts.hash_size {
            return Err(format!(
                "matrix has {} rows, hash_size is {}",
                self.matrix.rows(),
                opts.hash_size
            ));
        }
        if opts.term_freqs.len() != opts.hash_size as usize {
            return Err(format!(
                "term_freqs has {} entries, hash_size is {}",
                opts.term_freqs.len(),
                opts.hash_size
            ));
        }
        if self.matrix.cols() as usize != opts.doc2index.len() {
            return Err(format!(
                "matrix has {} columns, doc2index has {} documents",
                self.matrix.cols(),
                opts.doc2index.len()
            ));
        }
        let mut seen = HashSet::with_capacity(opts.doc2index.len());
        for (doc, &pos) in &opts.doc2index {
            if pos >= self.matrix.cols() {
                return Err(format!("document '{}' maps to column {} out of range", doc, pos));
            }
            if !seen.insert(pos) {
                return Err(format!("column {} is assigned to more than one document", pos));
            }
        }
        let (min, max) = opts.ngram_range;
        if min == 0 || min > max {
            return Err(format!("invalid ngram_range ({}, {})", min, max));
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Save an index to `path` with an atomic temp-file + rename.
pub fn save_index(path: &Path, matrix: &CsrMatrix, options: &IndexOptions) -> io::Result<()> {
    let artifact = IndexArtifactRef { matrix, options };
    let bytes = bincode::serialize(&artifact).map_err(|e| io::Error::other(e.to_string()))?;
    let crc = crc32fast::hash(&bytes);

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut output = Vec::with_capacity(bytes.len() + 8);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(INDEX_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    let tmp = tmp_path(path);
    fs::write(&tmp, &output)?;
    fs::rename(&tmp, path)?;

    tracing::info!(
        "Saved index {:?} ({} documents, {} nonzeros, {} bytes, CRC32={:#010x})",
        path,
        options.doc2index.len(),
        matrix.nnz(),
        bytes.len(),
        crc
    );
    Ok(())
}

/// Splits a raw index file into its payload, checking the `DRK1` footer and CRC.
fn split_footer(raw: &[u8]) -> io::Result<&[u8]> {
    let (payload, footer) = match raw.len().checked_sub(8) {
        Some(at) => raw.split_at(at),
        None => return Err(invalid("file is shorter than the index footer".to_string())),
    };
    let (magic, crc) = footer.split_at(4);
    if magic != INDEX_CRC_MAGIC {
        return Err(invalid("missing DRK1 footer".to_string()));
    }
    let stored = u32::from_be_bytes([crc[0], crc[1], crc[2], crc[3]]);
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(invalid(format!(
            "CRC32 mismatch: footer {:#010x}, payload {:#010x}",
            stored, computed
        )));
    }
    Ok(payload)
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

/// Load an index from `path`, verifying its checksum and invariants.
///
/// A missing file yields `ErrorKind::NotFound`; a truncated, corrupted, or
/// inconsistent file yields `ErrorKind::InvalidData`.
pub fn load_index(path: &Path) -> io::Result<IndexArtifact> {
    let raw = fs::read(path)?;
    let payload =
        split_footer(&raw).map_err(|e| invalid(format!("{:?} is not a valid index: {}", path, e)))?;

    let artifact: IndexArtifact =
        bincode::deserialize(payload).map_err(|e| invalid(e.to_string()))?;
    artifact
        .validate()
        .map_err(|e| invalid(format!("index validation failed: {}", e)))?;

    tracing::info!(
        "Loaded index {:?} ({} documents, {} nonzeros)",
        path,
        artifact.options.doc2index.len(),
        artifact.matrix.nnz()
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample() -> (CsrMatrix, IndexOptions) {
        let matrix = CsrMatrix::from_triplets(4, 2, [(1, 0, 0.5), (2, 1, 1.5), (3, 0, 2.0)]);
        let options = IndexOptions {
            ngram_range: (1, 2),
            hash_size: 4,
            term_freqs: vec![0, 1, 1, 1],
            doc2index: HashMap::from([("a".to_string(), 0), ("b".to_string(), 1)]),
        };
        (matrix, options)
    }

    #[test]
    fn test_save_and_load_preserves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tfidf.idx");
        let (matrix, options) = sample();
        save_index(&path, &matrix, &options).unwrap();
        assert!(!tmp_path(&path).exists());

        let loaded = load_index(&path).unwrap();
        assert_eq!(loaded.matrix, matrix);
        assert_eq!(loaded.options, options);
    }

    #[test]
    fn test_split_footer_is_strict() {
        let mut raw = b"payload".to_vec();
        raw.extend_from_slice(INDEX_CRC_MAGIC);
        raw.extend_from_slice(&crc32fast::hash(b"payload").to_be_bytes());
        assert_eq!(split_footer(&raw).unwrap(), b"payload");

        assert!(split_footer(&raw[..7]).is_err());
        let mut wrong_magic = raw.clone();
        wrong_magic[7] = b'X';
        assert_eq!(
            split_footer(&wrong_magic).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        let unfooted = b"payload without any footer at all".to_vec();
        assert!(split_footer(&unfooted).is_err());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfidf.idx");
        let (matrix, mut options) = sample();
        save_index(&path, &matrix, &options).unwrap();
        options.ngram_range = (1, 1);
        save_index(&path, &matrix, &options).unwrap();
        assert_eq!(load_index(&path).unwrap().options.ngram_range, (1, 1));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_index(&dir.path().join("absent.idx")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_crc_corruption_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfidf.idx");
        let (matrix, options) = sample();
        save_index(&path, &matrix, &options).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[0] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        let err = load_index(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("CRC32 mismatch"));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfidf.idx");
        fs::write(&path, b"abc").unwrap();
        let err = load_index(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_inconsistent_artifact_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfidf.idx");
        let (matrix, mut options) = sample();
        options.term_freqs.pop();
        save_index(&path, &matrix, &options).unwrap();
        let err = load_index(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("term_freqs"));
    }

    #[test]
    fn test_validate_rejects_shared_column() {
        let (matrix, mut options) = sample();
        options.doc2index.insert("b".to_string(), 0);
        options.doc2index.insert("c".to_string(), 1);
        let artifact = IndexArtifact { matrix, options };
        assert!(artifact.validate().is_err());
    }
}
