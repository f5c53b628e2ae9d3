//! Fan-out lookup coordinator.
//!
//! ```text
//! lookup(code)
//!   │ parse ──► Validation error (no cache read, no dispatch)
//!   ▼
//! CHECK_CACHE ── hit ──────────────────────────────────────────► return
//!   │ miss
//!   ▼
//! DISPATCHING: one task per source, each holding a worker permit
//!   ▼
//! COLLECTING: completion order, failed or panicked sources add nothing
//!   ▼
//! MERGING ── empty ──► NotFound (not cached)
//!   │
//!   ▼
//! CACHE_WRITE (configured TTL) ────────────────────────────────► return
//! ```

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::key::{derive_key, CacheKey};
use crate::lookup::{LookupConfig, LookupError};
use crate::metrics::LookupMetrics;
use crate::model::AggregateResult;
use crate::query::Query;
use crate::registry::SourceRegistry;
use crate::source::fetch_source_rows;

/// Runs lookups across every registered source.
///
/// Cheap to share behind an `Arc`; all state it mutates (cache, worker pool,
/// counters) is itself concurrency-safe.
pub struct StockLookup {
    registry: Arc<SourceRegistry>,
    cache: Arc<dyn CacheStore>,
    workers: Arc<Semaphore>,
    worker_count: usize,
    config: LookupConfig,
    metrics: Arc<LookupMetrics>,
}

impl StockLookup {
    /// Create a coordinator with its own metrics.
    ///
    /// # Arguments
    ///
    /// * `registry` - Sources to fan out to
    /// * `cache` - Store for merged results
    /// * `config` - TTL, timeouts, worker pool size and match mode
    pub fn new(
        registry: Arc<SourceRegistry>,
        cache: Arc<dyn CacheStore>,
        config: LookupConfig,
    ) -> Self {
        Self::with_metrics(registry, cache, config, Arc::new(LookupMetrics::new()))
    }

    /// Create a coordinator reporting into shared metrics.
    pub fn with_metrics(
        registry: Arc<SourceRegistry>,
        cache: Arc<dyn CacheStore>,
        config: LookupConfig,
        metrics: Arc<LookupMetrics>,
    ) -> Self {
        let worker_count = config.effective_workers(registry.len());
        Self {
            registry,
            cache,
            workers: Arc::new(Semaphore::new(worker_count)),
            worker_count,
            config,
            metrics,
        }
    }

    /// Look up a raw product code.
    ///
    /// # Errors
    ///
    /// - [`LookupError::Validation`] if the code is blank
    /// - [`LookupError::NotFound`] if no source has a match
    pub async fn lookup(&self, code: &str) -> Result<AggregateResult, LookupError> {
        let query = match Query::parse(code) {
            Ok(query) => query,
            Err(e) => {
                self.metrics.lookup_started();
                self.metrics.validation_failed();
                debug!(error = %e, "Rejected lookup");
                return Err(e);
            }
        };
        self.lookup_query(&query).await
    }

    /// Look up an already validated query.
    pub async fn lookup_query(&self, query: &Query) -> Result<AggregateResult, LookupError> {
        self.metrics.lookup_started();
        let started = Instant::now();
        let key = derive_key(query);

        if let Some(cached) = self.cache_get(&key).await {
            self.metrics.cache_hit();
            self.metrics.rows_returned(cached.len());
            debug!(code = %query, key = %key, rows = cached.len(), "Served from cache");
            return Ok(cached);
        }
        self.metrics.cache_miss();

        let aggregate = self.dispatch(query).await;

        if aggregate.is_empty() {
            self.metrics.not_found();
            info!(
                code = %query,
                sources = self.registry.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "No stock found"
            );
            return Err(LookupError::NotFound {
                code: query.code().to_string(),
            });
        }

        self.cache_set(&key, &aggregate).await;
        self.metrics.rows_returned(aggregate.len());
        info!(
            code = %query,
            rows = aggregate.len(),
            sources = aggregate.source_ids().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Lookup complete"
        );
        Ok(aggregate)
    }

    /// Fan out to every source and merge in completion order.
    async fn dispatch(&self, query: &Query) -> AggregateResult {
        let filter = Arc::new(query.filter(self.config.match_mode));
        let timeout = self.config.source_timeout;

        debug!(
            code = %query,
            sources = self.registry.len(),
            workers = self.worker_count,
            "Dispatching to sources"
        );

        let mut pending = FuturesUnordered::new();
        for source in self.registry.iter() {
            let source = Arc::clone(source);
            let filter = Arc::clone(&filter);
            let workers = Arc::clone(&self.workers);
            let metrics = Arc::clone(&self.metrics);
            let id = source.id().to_string();

            let handle = tokio::spawn(async move {
                let _permit = workers.acquire_owned().await.ok()?;
                metrics.source_dispatched();
                Some(
                    fetch_source_rows(source.descriptor(), source.adapter(), &filter, timeout)
                        .await,
                )
            });
            pending.push(async move { (id, handle.await) });
        }

        let mut aggregate = AggregateResult::new();
        while let Some((id, joined)) = pending.next().await {
            match joined {
                Ok(Some(fetch)) => {
                    if fetch.is_failed() {
                        self.metrics.source_failed();
                    }
                    aggregate.extend_from_source(&id, fetch.into_rows());
                }
                Ok(None) => {
                    self.metrics.source_failed();
                    warn!(source = %id, "Worker pool closed, source skipped");
                }
                Err(e) => {
                    self.metrics.source_failed();
                    warn!(source = %id, error = %e, "Source task aborted, contributing no rows");
                }
            }
        }

        aggregate
    }

    async fn cache_get(&self, key: &CacheKey) -> Option<AggregateResult> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, key = %key, "Cache get failed, treating as miss");
                None
            }
        }
    }

    async fn cache_set(&self, key: &CacheKey, aggregate: &AggregateResult) {
        if let Err(e) = self
            .cache
            .set(key, aggregate.clone(), self.config.cache_ttl)
            .await
        {
            warn!(error = %e, key = %key, "Cache set failed, result not cached");
        }
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<LookupMetrics> {
        &self.metrics
    }

    /// Size of the worker pool.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}
