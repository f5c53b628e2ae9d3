//! Application bootstrap and lifecycle.
//!
//! ```text
//! AppConfig ──► AdapterSet ──► SourceRegistry ─┐
//!                                              ├──► StockLookup ──► StockApp
//!               MemoryCacheStore ──────────────┤
//!               LookupMetrics ─────────────────┘
//! ```
//!
//! The cache is created here, once, and lives as long as the app.

mod bootstrap;
mod config;
mod error;

pub use bootstrap::StockApp;
pub use config::AppConfig;
pub use error::AppError;
