//! Fan-out stock lookup.
//!
//! [`StockLookup`] validates a product code, answers from the cache when it
//! can, and otherwise queries every registered source concurrently through a
//! bounded worker pool, merging whatever rows come back.
//!
//! # Example
//!
//! ```ignore
//! use stockfan::lookup::{LookupConfig, StockLookup};
//!
//! let lookup = StockLookup::new(registry, cache, LookupConfig::default());
//! let rows = lookup.lookup("X1").await?;
//! for row in rows.iter() {
//!     println!("{} {} {}", row.source_id, row.product_code, row.quantity_units);
//! }
//! ```

mod config;
mod coordinator;
mod error;

pub use config::{LookupConfig, DEFAULT_CACHE_TTL, DEFAULT_SOURCE_TIMEOUT};
pub use coordinator::StockLookup;
pub use error::LookupError;
