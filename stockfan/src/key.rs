//! Cache key derivation.
//!
//! Raw product codes can contain characters that are awkward in cache keys
//! and log fields. Keys are the SHA-256 of the trimmed code, rendered as
//! lowercase hex, so every key has the same length and alphabet.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::query::Query;

/// Length of a rendered cache key in characters.
pub const CACHE_KEY_LEN: usize = 64;

/// Content-derived cache key for a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// The hex-encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for a normalized query.
///
/// Pure function of the trimmed code: stable across calls and restarts.
pub fn derive_key(query: &Query) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(query.code().as_bytes());
    CacheKey(format!("{:x}", hasher.finalize()))
}
