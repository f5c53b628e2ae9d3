use std::time::{Duration, Instant};

use crate::key::CacheKey;
use crate::model::AggregateResult;

/// A stored aggregate with its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: AggregateResult,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(key: CacheKey, value: AggregateResult, ttl: Duration) -> Self {
        Self {
            key,
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Whether the entry is past its TTL at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }
}
