//! The adapter boundary: one full connect → query → close cycle.
//!
//! Per-source failures stop here. Whatever goes wrong (unreachable source,
//! failing query, timeout) the caller gets "no rows" and a `warn!` line, so
//! one bad source never blocks or fails a lookup.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::model::SourceRow;
use crate::query::StockFilter;
use crate::source::{SourceAdapter, SourceDescriptor, SourceError};

/// Upper bound on how long releasing a connection may take.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one source's part in a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFetch {
    /// The source returned matching rows.
    Rows(Vec<SourceRow>),
    /// The source answered but had nothing matching.
    Empty,
    /// The source failed; the error has already been logged.
    Failed(SourceError),
}

impl SourceFetch {
    /// Rows contributed to the aggregate (empty for `Empty` and `Failed`).
    pub fn into_rows(self) -> Vec<SourceRow> {
        match self {
            SourceFetch::Rows(rows) => rows,
            SourceFetch::Empty | SourceFetch::Failed(_) => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SourceFetch::Failed(_))
    }
}

/// Query one source, never propagating its errors.
///
/// `timeout` bounds connect plus query. The connection, once opened, is
/// closed before this returns on every path.
pub async fn fetch_source_rows(
    descriptor: &SourceDescriptor,
    adapter: &dyn SourceAdapter,
    filter: &StockFilter,
    timeout: Duration,
) -> SourceFetch {
    let started = Instant::now();

    match run_source(descriptor, adapter, filter, timeout).await {
        Ok(rows) if rows.is_empty() => {
            debug!(
                source = %descriptor.id,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Source returned no rows"
            );
            SourceFetch::Empty
        }
        Ok(rows) => {
            debug!(
                source = %descriptor.id,
                rows = rows.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Source returned rows"
            );
            SourceFetch::Rows(rows)
        }
        Err(e) => {
            warn!(
                source = %descriptor.id,
                adapter = adapter.name(),
                location = %descriptor.location.redacted(),
                error = %e,
                "Source lookup failed, contributing no rows"
            );
            SourceFetch::Failed(e)
        }
    }
}

async fn run_source(
    descriptor: &SourceDescriptor,
    adapter: &dyn SourceAdapter,
    filter: &StockFilter,
    timeout: Duration,
) -> Result<Vec<SourceRow>, SourceError> {
    let started = Instant::now();

    let mut connection = tokio::time::timeout(timeout, adapter.connect(&descriptor.location))
        .await
        .map_err(|_| SourceError::Timeout(timeout))??;

    let remaining = timeout.saturating_sub(started.elapsed());
    let result = match tokio::time::timeout(remaining, connection.query(filter)).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout)),
    };

    if tokio::time::timeout(CLOSE_TIMEOUT, connection.close())
        .await
        .is_err()
    {
        debug!(source = %descriptor.id, "Connection close timed out");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::MatchMode;
    use crate::source::{SourceConnection, SourceLocation};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    enum Behavior {
        Rows,
        NoRows,
        ConnectFails,
        QueryFails,
        QueryHangs,
    }

    struct ScriptedAdapter {
        behavior: Behavior,
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
    }

    struct ScriptedConnection {
        behavior: Behavior,
        closed: Arc<AtomicUsize>,
    }

    impl SourceAdapter for ScriptedAdapter {
        fn name(&self) -> &str {
            "scripted"
        }

        fn connect<'a>(
            &'a self,
            _location: &'a SourceLocation,
        ) -> BoxFuture<'a, Result<Box<dyn SourceConnection>, SourceError>> {
            Box::pin(async move {
                if let Behavior::ConnectFails = self.behavior {
                    return Err(SourceError::Connection("no driver".to_string()));
                }
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ScriptedConnection {
                    behavior: self.behavior,
                    closed: Arc::clone(&self.closed),
                }) as Box<dyn SourceConnection>)
            })
        }
    }

    impl SourceConnection for ScriptedConnection {
        fn query<'a>(
            &'a mut self,
            filter: &'a StockFilter,
        ) -> BoxFuture<'a, Result<Vec<SourceRow>, SourceError>> {
            Box::pin(async move {
                match self.behavior {
                    Behavior::Rows => Ok(vec![SourceRow::from_units(
                        filter.code.clone(),
                        10.0,
                        Some(3.0),
                    )]),
                    Behavior::NoRows => Ok(Vec::new()),
                    Behavior::QueryFails => Err(SourceError::Query("bad table".to_string())),
                    Behavior::QueryHangs => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(Vec::new())
                    }
                    Behavior::ConnectFails => unreachable!(),
                }
            })
        }

        fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
            Box::pin(async move {
                self.closed.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    fn adapter(behavior: Behavior) -> ScriptedAdapter {
        ScriptedAdapter {
            behavior,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn descriptor() -> SourceDescriptor {
        SourceDescriptor::new(
            "S1",
            SourceLocation::Http {
                base_url: "http://s1.local".to_string(),
            },
        )
    }

    fn filter() -> StockFilter {
        StockFilter {
            code: "X1".to_string(),
            mode: MatchMode::Exact,
        }
    }

    #[tokio::test]
    async fn test_rows_returned_and_connection_closed() {
        let adapter = adapter(Behavior::Rows);
        let fetch =
            fetch_source_rows(&descriptor(), &adapter, &filter(), Duration::from_secs(1)).await;

        assert_eq!(
            fetch,
            SourceFetch::Rows(vec![SourceRow::from_units("X1", 10.0, Some(3.0))])
        );
        assert_eq!(adapter.opened.load(Ordering::SeqCst), 1);
        assert_eq!(adapter.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_rows_is_empty() {
        let adapter = adapter(Behavior::NoRows);
        let fetch =
            fetch_source_rows(&descriptor(), &adapter, &filter(), Duration::from_secs(1)).await;

        assert_eq!(fetch, SourceFetch::Empty);
        assert_eq!(adapter.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_swallowed() {
        let adapter = adapter(Behavior::ConnectFails);
        let fetch =
            fetch_source_rows(&descriptor(), &adapter, &filter(), Duration::from_secs(1)).await;

        assert!(fetch.is_failed());
        assert!(fetch.into_rows().is_empty());
        assert_eq!(adapter.closed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_failure_still_closes() {
        let adapter = adapter(Behavior::QueryFails);
        let fetch =
            fetch_source_rows(&descriptor(), &adapter, &filter(), Duration::from_secs(1)).await;

        assert!(matches!(fetch, SourceFetch::Failed(SourceError::Query(_))));
        assert_eq!(adapter.opened.load(Ordering::SeqCst), 1);
        assert_eq!(adapter.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hung_query_times_out_and_closes() {
        let adapter = adapter(Behavior::QueryHangs);
        let started = Instant::now();
        let fetch = fetch_source_rows(
            &descriptor(),
            &adapter,
            &filter(),
            Duration::from_millis(50),
        )
        .await;

        assert!(matches!(fetch, SourceFetch::Failed(SourceError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(adapter.closed.load(Ordering::SeqCst), 1);
    }
}
