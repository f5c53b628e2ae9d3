//! Lookup result cache.
//!
//! - [`CacheStore`]: dyn-compatible store interface used by the coordinator
//! - [`MemoryCacheStore`]: moka-backed implementation with per-entry TTL
//! - [`CacheEntry`]: a stored aggregate plus `created_at` and `ttl`

mod entry;
mod memory;
mod traits;

pub use entry::CacheEntry;
pub use memory::MemoryCacheStore;
pub use traits::{CacheError, CacheStats, CacheStore, GcResult};
