//! Storage layer: on-disk index artifacts.
//!
//! A fitted index is written as a single bincode snapshot with a CRC32
//! footer (atomic temp-file + rename) and read back verbatim on load.

/// Index save/load with checksum verification.
pub mod persistence;

pub use persistence::{load_index, save_index, IndexArtifact};
