//! Application configuration for [`StockApp`](super::StockApp).
//!
//! `AppConfig` is the typed form of everything bootstrap needs: the sources
//! to register, coordinator settings and cache bounds. The CLI builds it from
//! the INI file; tests build it directly.

use std::time::Duration;

use crate::config::ConfigFile;
use crate::lookup::LookupConfig;
use crate::query::MatchMode;
use crate::source::SourceDescriptor;

/// Top-level configuration passed to `StockApp::start()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Sources in registration order.
    pub sources: Vec<SourceDescriptor>,

    /// Coordinator settings.
    pub lookup: LookupConfig,

    /// Cache entry bound; `None` means TTL only.
    pub cache_max_entries: Option<u64>,
}

impl AppConfig {
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        Self {
            sources,
            ..Self::default()
        }
    }

    /// Translate the user's config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let lookup = LookupConfig::default()
            .with_cache_ttl(Duration::from_secs(config.cache.ttl_secs))
            .with_source_timeout(Duration::from_secs(config.lookup.source_timeout_secs))
            .with_workers(config.lookup.workers)
            .with_match_mode(config.lookup.match_mode);

        Self {
            sources: config.sources.clone(),
            lookup,
            cache_max_entries: (config.cache.max_entries > 0).then_some(config.cache.max_entries),
        }
    }

    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.lookup.cache_ttl = ttl;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.lookup.source_timeout = timeout;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.lookup = self.lookup.with_workers(workers);
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.lookup.match_mode = mode;
        self
    }

    pub fn with_cache_max_entries(mut self, max: u64) -> Self {
        self.cache_max_entries = (max > 0).then_some(max);
        self
    }
}
