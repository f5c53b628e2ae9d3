//! File-backed stock source.
//!
//! Reads a JSON stock export (see [`crate::source::record`]) produced by a
//! store's back-office system. Connecting loads and parses the whole file;
//! the loaded lines live only as long as the connection.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tracing::debug;

use crate::model::SourceRow;
use crate::query::StockFilter;
use crate::source::record::{collect_rows, parse_records, StockRecord};
use crate::source::{SourceAdapter, SourceConnection, SourceError, SourceLocation};

/// Adapter for `snapshot:` locations.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotAdapter;

impl SnapshotAdapter {
    pub fn new() -> Self {
        Self
    }

    async fn open(path: &Path) -> Result<SnapshotConnection, SourceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            SourceError::Connection(format!("cannot read {}: {}", path.display(), e))
        })?;
        let records = parse_records(&bytes).map_err(|e| {
            SourceError::Connection(format!("invalid snapshot {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), lines = records.len(), "Snapshot loaded");

        Ok(SnapshotConnection {
            path: path.to_path_buf(),
            records,
        })
    }
}

impl SourceAdapter for SnapshotAdapter {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn connect<'a>(
        &'a self,
        location: &'a SourceLocation,
    ) -> BoxFuture<'a, Result<Box<dyn SourceConnection>, SourceError>> {
        Box::pin(async move {
            match location {
                SourceLocation::Snapshot { path } => {
                    let connection = Self::open(path).await?;
                    Ok(Box::new(connection) as Box<dyn SourceConnection>)
                }
                other => Err(SourceError::Connection(format!(
                    "snapshot adapter cannot open {} location",
                    other.kind()
                ))),
            }
        })
    }
}

/// Loaded snapshot.
pub struct SnapshotConnection {
    path: PathBuf,
    records: Vec<StockRecord>,
}

impl SourceConnection for SnapshotConnection {
    fn query<'a>(
        &'a mut self,
        filter: &'a StockFilter,
    ) -> BoxFuture<'a, Result<Vec<SourceRow>, SourceError>> {
        Box::pin(async move { Ok(collect_rows(&self.records, filter)) })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            debug!(path = %self.path.display(), "Snapshot released");
        })
    }
}
