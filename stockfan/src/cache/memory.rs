//! In-memory cache store using moka.
//!
//! Each entry carries its own TTL. moka's [`Expiry`] hook schedules the
//! eviction, and reads re-check `created_at + ttl` so an entry that moka has
//! not yet swept is still never returned.
//!
//! Without `max_entries` the store is bounded only by TTL expiry. With it,
//! moka's size-based eviction kicks in as well.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use moka::future::Cache as MokaCache;
use moka::Expiry;
use tracing::trace;

use crate::cache::entry::CacheEntry;
use crate::cache::traits::{CacheError, CacheStats, CacheStore, GcResult};
use crate::key::CacheKey;
use crate::model::AggregateResult;

/// Per-entry expiry: every entry lives for its own `ttl`.
struct EntryExpiry;

impl Expiry<CacheKey, Arc<CacheEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &Arc<CacheEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &Arc<CacheEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// moka-backed [`CacheStore`].
pub struct MemoryCacheStore {
    cache: MokaCache<CacheKey, Arc<CacheEntry>>,
    max_entries: Option<u64>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCacheStore {
    /// Create a store.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Optional entry-count bound; `None` means TTL only
    pub fn new(max_entries: Option<u64>) -> Self {
        let mut builder = MokaCache::builder().expire_after(EntryExpiry);
        if let Some(max) = max_entries {
            builder = builder.max_capacity(max);
        }

        Self {
            cache: builder.build(),
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn max_entries(&self) -> Option<u64> {
        self.max_entries
    }

    async fn live_entry(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        let entry = self.cache.get(key).await?;
        if entry.is_expired() {
            // Left for moka to evict; removing here could drop a fresher
            // entry written concurrently.
            trace!(key = %key, "Ignoring expired cache entry");
            return None;
        }
        Some(entry)
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CacheStore for MemoryCacheStore {
    fn get<'a>(
        &'a self,
        key: &'a CacheKey,
    ) -> BoxFuture<'a, Result<Option<AggregateResult>, CacheError>> {
        Box::pin(async move {
            match self.live_entry(key).await {
                Some(entry) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Ok(Some(entry.value.clone()))
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    Ok(None)
                }
            }
        })
    }

    fn set<'a>(
        &'a self,
        key: &'a CacheKey,
        value: AggregateResult,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            let entry = Arc::new(CacheEntry::new(key.clone(), value, ttl));
            self.cache.insert(key.clone(), entry).await;
            Ok(())
        })
    }

    fn contains<'a>(&'a self, key: &'a CacheKey) -> BoxFuture<'a, Result<bool, CacheError>> {
        Box::pin(async move { Ok(self.live_entry(key).await.is_some()) })
    }

    fn remove<'a>(&'a self, key: &'a CacheKey) -> BoxFuture<'a, Result<bool, CacheError>> {
        Box::pin(async move { Ok(self.cache.remove(key).await.is_some()) })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), CacheError>> {
        Box::pin(async move {
            self.cache.invalidate_all();
            self.cache.run_pending_tasks().await;
            Ok(())
        })
    }

    fn gc(&self) -> BoxFuture<'_, Result<GcResult, CacheError>> {
        Box::pin(async move {
            let start = Instant::now();
            let count_before = self.cache.entry_count();

            self.cache.run_pending_tasks().await;

            let count_after = self.cache.entry_count();
            Ok(GcResult {
                entries_removed: count_before.saturating_sub(count_after) as usize,
                duration_ms: start.elapsed().as_millis() as u64,
            })
        })
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.entry_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::derive_key;
    use crate::model::SourceRow;
    use crate::query::Query;

    fn key(code: &str) -> CacheKey {
        derive_key(&Query::parse(code).unwrap())
    }

    fn aggregate(code: &str, source: &str) -> AggregateResult {
        let mut result = AggregateResult::new();
        result.extend_from_source(source, vec![SourceRow::from_units(code, 10.0, Some(3.0))]);
        result
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryCacheStore::new(None);
        let k = key("X1");

        store
            .set(&k, aggregate("X1", "S1"), Duration::from_secs(600))
            .await
            .unwrap();

        let cached = store.get(&k).await.unwrap();
        assert_eq!(cached, Some(aggregate("X1", "S1")));
        assert!(store.contains(&k).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_counts_miss() {
        let store = MemoryCacheStore::new(None);

        assert_eq!(store.get(&key("nope")).await.unwrap(), None);

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_entry_not_returned_after_ttl() {
        let store = MemoryCacheStore::new(None);
        let k = key("X1");

        store
            .set(&k, aggregate("X1", "S1"), Duration::from_millis(50))
            .await
            .unwrap();
        assert!(store.get(&k).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(store.get(&k).await.unwrap(), None);
        assert!(!store.contains(&k).await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_have_independent_ttls() {
        let store = MemoryCacheStore::new(None);
        let short = key("short");
        let long = key("long");

        store
            .set(&short, aggregate("short", "S1"), Duration::from_millis(50))
            .await
            .unwrap();
        store
            .set(&long, aggregate("long", "S1"), Duration::from_secs(600))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(store.get(&short).await.unwrap().is_none());
        assert!(store.get(&long).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = MemoryCacheStore::new(None);
        let k = key("X1");

        store
            .set(&k, aggregate("X1", "S1"), Duration::from_secs(600))
            .await
            .unwrap();
        store
            .set(&k, aggregate("X1", "S2"), Duration::from_secs(600))
            .await
            .unwrap();

        assert_eq!(store.get(&k).await.unwrap(), Some(aggregate("X1", "S2")));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = MemoryCacheStore::new(None);
        let a = key("A");
        let b = key("B");

        store.set(&a, aggregate("A", "S1"), Duration::from_secs(60)).await.unwrap();
        store.set(&b, aggregate("B", "S1"), Duration::from_secs(60)).await.unwrap();

        assert!(store.remove(&a).await.unwrap());
        assert!(!store.remove(&a).await.unwrap());

        store.clear().await.unwrap();
        assert!(store.get(&b).await.unwrap().is_none());
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_writers_do_not_corrupt() {
        let store = Arc::new(MemoryCacheStore::new(None));

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let code = format!("P{}", i % 4);
                let k = key(&code);
                store
                    .set(&k, aggregate(&code, "S1"), Duration::from_secs(60))
                    .await
                    .unwrap();
                store.get(&k).await.unwrap()
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value.len(), 1);
        }
        for i in 0..4 {
            let code = format!("P{}", i);
            assert_eq!(
                store.get(&key(&code)).await.unwrap(),
                Some(aggregate(&code, "S1"))
            );
        }
    }

    #[tokio::test]
    async fn test_max_entries_bounds_store() {
        let store = MemoryCacheStore::new(Some(2));
        assert_eq!(store.max_entries(), Some(2));

        for code in ["A", "B", "C", "D", "E"] {
            store
                .set(&key(code), aggregate(code, "S1"), Duration::from_secs(60))
                .await
                .unwrap();
        }
        store.gc().await.unwrap();

        assert!(store.entry_count() <= 2);
    }
}
