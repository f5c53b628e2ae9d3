//! stockfan - fan-out stock lookup across inventory sources
//!
//! Given a product code, queries every configured inventory source
//! concurrently, merges the rows each one reports, and caches the merged
//! answer for a bounded time so repeated lookups skip the sources.
//!
//! ```text
//! code ──► Query ──► CacheKey ──► CacheStore ── hit ──► AggregateResult
//!                                     │ miss
//!                                     ▼
//!                      StockLookup ──► SourceAdapter × N (worker pool)
//!                                     │
//!                                     ▼
//!                               AggregateResult ──► CacheStore
//! ```

pub mod app;
pub mod cache;
pub mod config;
pub mod key;
pub mod logging;
pub mod lookup;
pub mod metrics;
pub mod model;
pub mod query;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
pub mod source;

pub use app::{AppConfig, AppError, StockApp};
pub use key::{derive_key, CacheKey};
pub use lookup::{LookupConfig, LookupError, StockLookup};
pub use model::{AggregateResult, SourceRow, StockRow};
pub use query::{MatchMode, Query, StockFilter};

/// Crate version, for `--version` output and logs.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
