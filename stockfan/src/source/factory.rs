//! Adapter selection by location kind.
//!
//! A registry built from configuration only knows each source's location.
//! [`AdapterSet`] holds one shared adapter per backend kind and hands out
//! the right one.

use std::sync::Arc;
use std::time::Duration;

use crate::source::{
    HttpAdapter, ReqwestClient, SnapshotAdapter, SourceAdapter, SourceError, SourceKind,
    SourceLocation,
};

/// One adapter instance per supported backend kind.
#[derive(Clone)]
pub struct AdapterSet {
    snapshot: Arc<dyn SourceAdapter>,
    http: Arc<dyn SourceAdapter>,
    #[cfg(feature = "postgres")]
    postgres: Arc<dyn SourceAdapter>,
}

impl AdapterSet {
    /// Create the default adapters.
    ///
    /// # Arguments
    ///
    /// * `http_timeout` - Request timeout for the shared HTTP client
    pub fn new(http_timeout: Duration) -> Result<Self, SourceError> {
        let http_client = ReqwestClient::with_timeout(http_timeout)?;
        Ok(Self {
            snapshot: Arc::new(SnapshotAdapter::new()),
            http: Arc::new(HttpAdapter::new(http_client)),
            #[cfg(feature = "postgres")]
            postgres: Arc::new(crate::source::PostgresAdapter::new()),
        })
    }

    /// Replace the adapter used for one kind.
    pub fn with_adapter(mut self, kind: SourceKind, adapter: Arc<dyn SourceAdapter>) -> Self {
        match kind {
            SourceKind::Snapshot => self.snapshot = adapter,
            SourceKind::Http => self.http = adapter,
            #[cfg(feature = "postgres")]
            SourceKind::Postgres => self.postgres = adapter,
            #[cfg(not(feature = "postgres"))]
            SourceKind::Postgres => {}
        }
        self
    }

    /// The adapter serving `location`, or `None` if this build lacks one.
    pub fn adapter_for(&self, location: &SourceLocation) -> Option<Arc<dyn SourceAdapter>> {
        match location.kind() {
            SourceKind::Snapshot => Some(Arc::clone(&self.snapshot)),
            SourceKind::Http => Some(Arc::clone(&self.http)),
            #[cfg(feature = "postgres")]
            SourceKind::Postgres => Some(Arc::clone(&self.postgres)),
            #[cfg(not(feature = "postgres"))]
            SourceKind::Postgres => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_adapter_for_snapshot_and_http() {
        let set = AdapterSet::new(Duration::from_secs(5)).unwrap();

        let snapshot = set
            .adapter_for(&SourceLocation::Snapshot {
                path: PathBuf::from("/tmp/a.json"),
            })
            .unwrap();
        assert_eq!(snapshot.name(), "snapshot");

        let http = set
            .adapter_for(&SourceLocation::Http {
                base_url: "http://localhost".to_string(),
            })
            .unwrap();
        assert_eq!(http.name(), "http");
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn test_postgres_unavailable_without_feature() {
        let set = AdapterSet::new(Duration::from_secs(5)).unwrap();
        let loc = SourceLocation::Postgres {
            url: "postgres://db/stock".to_string(),
        };
        assert!(set.adapter_for(&loc).is_none());
    }

    #[test]
    fn test_with_adapter_overrides_kind() {
        let set = AdapterSet::new(Duration::from_secs(5))
            .unwrap()
            .with_adapter(SourceKind::Http, Arc::new(SnapshotAdapter::new()));

        let adapter = set
            .adapter_for(&SourceLocation::Http {
                base_url: "http://localhost".to_string(),
            })
            .unwrap();
        assert_eq!(adapter.name(), "snapshot");
    }
}
