//! Lookup telemetry.
//!
//! Lock-free counters updated by the coordinator, read through a
//! point-in-time [`MetricsSnapshot`].
//!
//! ```text
//! StockLookup ─────► LookupMetrics ─────► MetricsSnapshot ─────► CLI
//!                    (atomic counters)    (plain copy)
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for lookup activity.
#[derive(Debug, Default)]
pub struct LookupMetrics {
    lookups: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    validation_failures: AtomicU64,
    not_found: AtomicU64,
    source_dispatches: AtomicU64,
    source_failures: AtomicU64,
    rows_returned: AtomicU64,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_started(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_failed(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn source_dispatched(&self) {
        self.source_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    /// A source failed and contributed no rows.
    pub fn source_failed(&self) {
        self.source_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rows_returned(&self, count: usize) {
        self.rows_returned.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            source_dispatches: self.source_dispatches.load(Ordering::Relaxed),
            source_failures: self.source_failures.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`LookupMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lookups: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub validation_failures: u64,
    pub not_found: u64,
    pub source_dispatches: u64,
    pub source_failures: u64,
    pub rows_returned: u64,
}

impl MetricsSnapshot {
    /// Share of cache checks that were hits, `0.0` before the first check.
    pub fn hit_rate(&self) -> f64 {
        let checks = self.cache_hits + self.cache_misses;
        if checks == 0 {
            0.0
        } else {
            self.cache_hits as f64 / checks as f64
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lookups:             {}", self.lookups)?;
        writeln!(
            f,
            "Cache hits/misses:   {}/{} ({:.1}% hit rate)",
            self.cache_hits,
            self.cache_misses,
            self.hit_rate() * 100.0
        )?;
        writeln!(f, "Validation failures: {}", self.validation_failures)?;
        writeln!(f, "Not found:           {}", self.not_found)?;
        writeln!(f, "Source dispatches:   {}", self.source_dispatches)?;
        writeln!(f, "Source failures:     {}", self.source_failures)?;
        write!(f, "Rows returned:       {}", self.rows_returned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = LookupMetrics::new();
        metrics.lookup_started();
        metrics.lookup_started();
        metrics.cache_miss();
        metrics.cache_hit();
        metrics.source_dispatched();
        metrics.source_dispatched();
        metrics.source_failed();
        metrics.rows_returned(3);

        let snap = metrics.snapshot();
        assert_eq!(snap.lookups, 2);
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.cache_misses, 1);
        assert_eq!(snap.source_dispatches, 2);
        assert_eq!(snap.source_failures, 1);
        assert_eq!(snap.rows_returned, 3);
        assert!((snap.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_rate_without_checks() {
        assert_eq!(MetricsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_display_mentions_hit_rate() {
        let snap = MetricsSnapshot {
            cache_hits: 1,
            cache_misses: 3,
            ..Default::default()
        };
        assert!(snap.to_string().contains("25.0% hit rate"));
    }
}
