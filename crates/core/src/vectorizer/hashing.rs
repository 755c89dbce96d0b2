//! Feature hashing of n-grams.

/// Hashed slot of `term` in a space of `hash_size` slots.
///
/// CRC32 of the UTF-8 bytes, reduced modulo `hash_size`. Stable across
/// platforms and process runs, which persisted indexes depend on.
pub fn hash_term(term: &str, hash_size: u32) -> u32 {
    debug_assert!(hash_size > 0);
    crc32fast::hash(term.as_bytes()) % hash_size
}
