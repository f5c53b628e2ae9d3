//! Inventory source abstraction.
//!
//! Every backend kind implements the same capability:
//!
//! ```text
//! SourceAdapter::connect(location) ──► SourceConnection
//!                                        ├── query(filter) ──► Vec<SourceRow>
//!                                        └── close()
//! ```
//!
//! The coordinator never talks to a connection directly. It goes through
//! [`fetch_source_rows`], which runs the whole cycle under a timeout and
//! turns any failure into an empty contribution.
//!
//! # Available Adapters
//!
//! - [`SnapshotAdapter`]: JSON stock export on disk (`snapshot:<path>`)
//! - [`HttpAdapter`]: remote inventory endpoint (`http(s)://...`)
//! - `PostgresAdapter`: back-office database (`postgres://...`, feature `postgres`)
//!
//! # Factory
//!
//! ```ignore
//! use stockfan::source::{AdapterSet, SourceLocation};
//!
//! let adapters = AdapterSet::new(Duration::from_secs(30))?;
//! let location: SourceLocation = "snapshot:/srv/stock/kom.json".parse()?;
//! let adapter = adapters.adapter_for(&location).expect("supported kind");
//! ```

mod factory;
mod fetch;
mod http;
#[cfg(feature = "postgres")]
mod postgres;
pub mod record;
mod snapshot;
mod types;

pub use factory::AdapterSet;
pub use fetch::{fetch_source_rows, SourceFetch};
pub use http::{HttpAdapter, HttpClient, HttpConnection, ReqwestClient, DEFAULT_HTTP_TIMEOUT};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresAdapter, PostgresConnection};
pub use snapshot::{SnapshotAdapter, SnapshotConnection};
pub use types::{
    SourceAdapter, SourceConnection, SourceDescriptor, SourceError, SourceKind, SourceLocation,
};
