//! Application bootstrap implementation.
//!
//! `StockApp` wires adapters, registry, cache and coordinator together in one
//! place, and owns a Tokio runtime when started from synchronous code.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{CacheStore, MemoryCacheStore};
use crate::lookup::{LookupError, StockLookup};
use crate::metrics::LookupMetrics;
use crate::model::AggregateResult;
use crate::registry::SourceRegistry;
use crate::source::AdapterSet;

/// A started stock lookup service.
///
/// # Example
///
/// ```ignore
/// use stockfan::app::{AppConfig, StockApp};
///
/// // From async code
/// let app = StockApp::start(config).await?;
/// let rows = app.lookup("X1").await?;
/// app.shutdown().await;
///
/// // From sync code
/// let app = StockApp::start_sync(config)?;
/// let rows = app.lookup_blocking("X1")?;
/// app.shutdown_sync();
/// ```
pub struct StockApp {
    lookup: Arc<StockLookup>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<LookupMetrics>,
    config: AppConfig,

    /// Set only when created via `start_sync()`.
    runtime: Option<Runtime>,
}

impl StockApp {
    /// Start with the default adapter for each backend kind.
    ///
    /// # Errors
    ///
    /// Fails if adapters cannot be created or the registry is invalid
    /// (empty or duplicate ids, unsupported backends).
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let adapters = AdapterSet::new(config.lookup.source_timeout)?;
        Self::start_with_adapters(config, adapters).await
    }

    /// Start with a caller-provided adapter set.
    pub async fn start_with_adapters(
        config: AppConfig,
        adapters: AdapterSet,
    ) -> Result<Self, AppError> {
        Self::build(config, &adapters)
    }

    /// Start synchronously, creating a dedicated runtime.
    ///
    /// The runtime lives as long as the app and drives
    /// [`lookup_blocking`](Self::lookup_blocking).
    pub fn start_sync(config: AppConfig) -> Result<Self, AppError> {
        let runtime = Runtime::new().map_err(|e| AppError::RuntimeCreation(e.to_string()))?;

        let mut app = runtime.block_on(Self::start(config))?;
        app.runtime = Some(runtime);

        Ok(app)
    }

    fn build(config: AppConfig, adapters: &AdapterSet) -> Result<Self, AppError> {
        let registry = Arc::new(SourceRegistry::from_descriptors(
            config.sources.clone(),
            adapters,
        )?);

        let cache: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new(config.cache_max_entries));
        let metrics = Arc::new(LookupMetrics::new());

        let lookup = Arc::new(StockLookup::with_metrics(
            Arc::clone(&registry),
            Arc::clone(&cache),
            config.lookup.clone(),
            Arc::clone(&metrics),
        ));

        info!(
            sources = registry.len(),
            workers = lookup.worker_count(),
            cache_ttl_secs = config.lookup.cache_ttl.as_secs(),
            source_timeout_secs = config.lookup.source_timeout.as_secs(),
            match_mode = %config.lookup.match_mode,
            "Stock lookup service started"
        );

        Ok(Self {
            lookup,
            cache,
            metrics,
            config,
            runtime: None,
        })
    }

    /// Look up a product code across all sources.
    pub async fn lookup(&self, code: &str) -> Result<AggregateResult, LookupError> {
        self.lookup.lookup(code).await
    }

    /// Blocking lookup on the app's own runtime.
    ///
    /// # Errors
    ///
    /// [`AppError::NoRuntime`] when started with `start()`, otherwise the
    /// lookup's own error wrapped in [`AppError::Lookup`].
    pub fn lookup_blocking(&self, code: &str) -> Result<AggregateResult, AppError> {
        let runtime = self.runtime.as_ref().ok_or(AppError::NoRuntime)?;
        Ok(runtime.block_on(self.lookup.lookup(code))?)
    }

    /// Handle to the runtime driving this app.
    ///
    /// # Panics
    ///
    /// Panics if the app was started with `start()` and is queried outside
    /// any runtime.
    pub fn runtime_handle(&self) -> tokio::runtime::Handle {
        self.runtime
            .as_ref()
            .map(|r| r.handle().clone())
            .unwrap_or_else(tokio::runtime::Handle::current)
    }

    /// Shared coordinator, e.g. for the HTTP router.
    pub fn lookup_service(&self) -> Arc<StockLookup> {
        Arc::clone(&self.lookup)
    }

    pub fn registry(&self) -> &Arc<SourceRegistry> {
        self.lookup.registry()
    }

    pub fn cache(&self) -> Arc<dyn CacheStore> {
        Arc::clone(&self.cache)
    }

    pub fn metrics(&self) -> Arc<LookupMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Clear the cache and stop. Usable from async code for either kind of
    /// app; an owned runtime is released in the background.
    pub async fn shutdown(mut self) {
        info!("Shutting down stock lookup service");
        self.release_cache().await;
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        self.log_final_metrics();
    }

    /// Clear the cache and stop an app created with `start_sync()`.
    pub fn shutdown_sync(mut self) {
        info!("Shutting down stock lookup service");
        // Without an owned runtime the cache is simply dropped with the app.
        if let Some(runtime) = self.runtime.take() {
            runtime.block_on(self.release_cache());
        }
        self.log_final_metrics();
    }

    async fn release_cache(&self) {
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to clear cache on shutdown");
        }
    }

    fn log_final_metrics(&self) {
        let snapshot = self.metrics.snapshot();
        info!(
            lookups = snapshot.lookups,
            cache_hits = snapshot.cache_hits,
            cache_misses = snapshot.cache_misses,
            not_found = snapshot.not_found,
            source_failures = snapshot.source_failures,
            "Stock lookup service stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceDescriptor, SourceLocation};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn snapshot_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn config_for(files: &[(&str, &NamedTempFile)]) -> AppConfig {
        let mut config = AppConfig::default();
        for (id, file) in files {
            config = config.with_source(SourceDescriptor::new(
                *id,
                SourceLocation::Snapshot {
                    path: file.path().to_path_buf(),
                },
            ));
        }
        config
    }

    #[tokio::test]
    async fn test_app_start_lookup_and_shutdown() {
        let kom = snapshot_file(r#"[{"code": "X1", "units": 10, "unitsPerCase": 3}]"#);
        let arg = snapshot_file(r#"[{"code": "Y2", "units": 4}]"#);

        let app = StockApp::start(config_for(&[("Komerco", &kom), ("Argentina", &arg)]))
            .await
            .unwrap();
        assert_eq!(app.registry().len(), 2);

        let result = app.lookup("X1").await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.rows()[0].source_id, "Komerco");
        assert_eq!(result.rows()[0].quantity_cases, 3);

        assert!(app.lookup("ZZZ").await.unwrap_err().is_not_found());
        assert_eq!(app.metrics().snapshot().lookups, 2);

        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_lookup_blocking_requires_owned_runtime() {
        let app = StockApp::start(AppConfig::default()).await.unwrap();
        assert!(matches!(app.lookup_blocking("X1"), Err(AppError::NoRuntime)));
        app.shutdown().await;
    }

    #[tokio::test]
    async fn test_duplicate_sources_rejected() {
        let file = snapshot_file("[]");
        let result = StockApp::start(config_for(&[("A", &file), ("A", &file)])).await;
        assert!(matches!(result, Err(AppError::Registry(_))));
    }

    #[test]
    fn test_start_sync_and_lookup_blocking() {
        let kom = snapshot_file(r#"[{"code": "X1", "units": 2}]"#);

        let app = StockApp::start_sync(config_for(&[("Komerco", &kom)])).unwrap();
        let first = app.lookup_blocking("X1").unwrap();
        let second = app.lookup_blocking("X1").unwrap();

        assert_eq!(first, second);
        assert_eq!(app.metrics().snapshot().cache_hits, 1);

        assert!(matches!(
            app.lookup_blocking(" "),
            Err(AppError::Lookup(LookupError::Validation(_)))
        ));

        app.shutdown_sync();
    }
}
