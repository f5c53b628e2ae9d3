use std::time::Duration;

use crate::query::MatchMode;

/// Default TTL for cached aggregates (10 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Default bound on one source's connect + query.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Coordinator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    /// TTL applied to every cache write.
    pub cache_ttl: Duration,
    /// Per-source connect + query bound.
    pub source_timeout: Duration,
    /// Worker pool size; `None` means one worker per source.
    pub workers: Option<usize>,
    pub match_mode: MatchMode,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            workers: None,
            match_mode: MatchMode::default(),
        }
    }
}

impl LookupConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    /// Fix the worker pool size. Zero is treated as "one per source".
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = (workers > 0).then_some(workers);
        self
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Pool size for a registry of `source_count` sources.
    pub fn effective_workers(&self, source_count: usize) -> usize {
        self.workers.unwrap_or(source_count).max(1)
    }
}
