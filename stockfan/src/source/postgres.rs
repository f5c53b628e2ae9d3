//! PostgreSQL stock source (feature `postgres`).
//!
//! Expects the back-office layout used by the stores' accounting package:
//! a `stock` table with one line per article and warehouse, and an
//! `articles` table carrying the pack size.
//!
//! ```sql
//! CREATE TABLE articles (code TEXT PRIMARY KEY, units_per_case NUMERIC);
//! CREATE TABLE stock (product_code TEXT REFERENCES articles(code), quantity NUMERIC);
//! ```
//!
//! Units are summed per article; case counts are derived in Rust with the
//! same rounding policy as every other adapter.

use futures::future::BoxFuture;
use sqlx::{Connection, PgConnection, Row};
use tracing::debug;

use crate::model::SourceRow;
use crate::query::{MatchMode, StockFilter};
use crate::source::{SourceAdapter, SourceConnection, SourceError, SourceLocation};

const CONTAINS_SQL: &str = r#"
    SELECT s.product_code,
           SUM(s.quantity)::float8 AS units,
           MAX(a.units_per_case)::float8 AS units_per_case
    FROM stock s
    INNER JOIN articles a ON s.product_code = a.code
    WHERE s.product_code ILIKE $1 ESCAPE '\'
    GROUP BY s.product_code
    ORDER BY s.product_code
"#;

const EXACT_SQL: &str = r#"
    SELECT s.product_code,
           SUM(s.quantity)::float8 AS units,
           MAX(a.units_per_case)::float8 AS units_per_case
    FROM stock s
    INNER JOIN articles a ON s.product_code = a.code
    WHERE lower(s.product_code) = lower($1)
    GROUP BY s.product_code
"#;

/// Adapter for `postgres:` locations.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresAdapter;

impl PostgresAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl SourceAdapter for PostgresAdapter {
    fn name(&self) -> &str {
        "postgres"
    }

    fn connect<'a>(
        &'a self,
        location: &'a SourceLocation,
    ) -> BoxFuture<'a, Result<Box<dyn SourceConnection>, SourceError>> {
        Box::pin(async move {
            match location {
                SourceLocation::Postgres { url } => {
                    let conn = PgConnection::connect(url)
                        .await
                        .map_err(|e| SourceError::Connection(e.to_string()))?;
                    Ok(Box::new(PostgresConnection { conn }) as Box<dyn SourceConnection>)
                }
                other => Err(SourceError::Connection(format!(
                    "postgres adapter cannot open {} location",
                    other.kind()
                ))),
            }
        })
    }
}

/// One open PostgreSQL session.
pub struct PostgresConnection {
    conn: PgConnection,
}

impl SourceConnection for PostgresConnection {
    fn query<'a>(
        &'a mut self,
        filter: &'a StockFilter,
    ) -> BoxFuture<'a, Result<Vec<SourceRow>, SourceError>> {
        Box::pin(async move {
            let (sql, param) = match filter.mode {
                MatchMode::Contains => (CONTAINS_SQL, filter.like_pattern()),
                MatchMode::Exact => (EXACT_SQL, filter.code.clone()),
            };

            let rows = sqlx::query(sql)
                .bind(param)
                .fetch_all(&mut self.conn)
                .await
                .map_err(|e| SourceError::Query(e.to_string()))?;

            rows.iter()
                .map(|row| {
                    let code: String = row
                        .try_get("product_code")
                        .map_err(|e| SourceError::Query(e.to_string()))?;
                    let units: Option<f64> = row
                        .try_get("units")
                        .map_err(|e| SourceError::Query(e.to_string()))?;
                    let per_case: Option<f64> = row
                        .try_get("units_per_case")
                        .map_err(|e| SourceError::Query(e.to_string()))?;
                    Ok(SourceRow::from_units(code, units.unwrap_or(0.0), per_case))
                })
                .collect()
        })
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if let Err(e) = self.conn.close().await {
                debug!(error = %e, "PostgreSQL connection did not close cleanly");
            }
        })
    }
}
