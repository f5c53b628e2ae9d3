//! Core trait for the lookup result cache.
//!
//! The coordinator only ever sees `Arc<dyn CacheStore>`, so the store behind
//! it can be swapped (in-memory today) without touching lookup code.
//!
//! # Example
//!
//! ```ignore
//! use stockfan::cache::{CacheStore, MemoryCacheStore};
//!
//! let store = MemoryCacheStore::new(None);
//! store.set(&key, aggregate, Duration::from_secs(600)).await?;
//! let cached = store.get(&key).await?;
//! ```

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::key::CacheKey;
use crate::model::AggregateResult;

/// Result of a garbage collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcResult {
    /// Number of entries dropped during GC.
    pub entries_removed: usize,
    /// Duration of the pass in milliseconds.
    pub duration_ms: u64,
}

impl fmt::Display for GcResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GC: removed {} entries in {}ms",
            self.entries_removed, self.duration_ms
        )
    }
}

/// Hit/miss counters kept by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl CacheStats {
    /// Fraction of reads served from the cache, `0.0` before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Errors a cache backend can report.
///
/// The coordinator never surfaces these to callers: a failed read is a miss
/// and a failed write is skipped.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend-specific failure.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// The store has been shut down.
    #[error("Cache is closed")]
    Closed,
}

/// Key-value store for merged lookup results with per-entry expiry.
///
/// # Expiry
///
/// An entry is never returned once `now - created_at > ttl`. Stores may
/// evict lazily; an expired entry behaves exactly like a missing one.
///
/// # Concurrency
///
/// Implementations must be safe to share across lookup tasks. Concurrent
/// `set` calls for the same key resolve as last writer wins.
pub trait CacheStore: Send + Sync {
    /// Fetch a live entry.
    fn get<'a>(&'a self, key: &'a CacheKey)
        -> BoxFuture<'a, Result<Option<AggregateResult>, CacheError>>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set<'a>(
        &'a self,
        key: &'a CacheKey,
        value: AggregateResult,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>>;

    /// Whether a live entry exists. Does not count as a hit or miss.
    fn contains<'a>(&'a self, key: &'a CacheKey) -> BoxFuture<'a, Result<bool, CacheError>>;

    /// Remove an entry, returning whether one was present.
    fn remove<'a>(&'a self, key: &'a CacheKey) -> BoxFuture<'a, Result<bool, CacheError>>;

    /// Drop every entry.
    fn clear(&self) -> BoxFuture<'_, Result<(), CacheError>>;

    /// Run pending maintenance (expired entry eviction).
    fn gc(&self) -> BoxFuture<'_, Result<GcResult, CacheError>>;

    /// Approximate number of stored entries.
    fn entry_count(&self) -> u64;

    fn stats(&self) -> CacheStats;
}
