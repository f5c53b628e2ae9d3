//! Row and result model shared by every source adapter.
//!
//! Adapters emit [`SourceRow`]s. The coordinator stamps each one with the id
//! of the registry entry it came from, producing a [`StockRow`], so an adapter
//! never needs to know which id it was registered under.

use serde::{Deserialize, Serialize};

/// Number of whole cases for a unit count, rounded to nearest.
///
/// Returns `0` when `units_per_case` is absent, zero, negative or not a
/// finite number. Halves round away from zero.
pub fn cases_for(quantity_units: f64, units_per_case: Option<f64>) -> i64 {
    match units_per_case {
        Some(per_case) if per_case.is_finite() && per_case > 0.0 => {
            let cases = (quantity_units / per_case).round();
            if cases.is_finite() {
                cases as i64
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// One matching stock record as reported by a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRow {
    pub product_code: String,
    pub quantity_units: f64,
    pub quantity_cases: i64,
}

impl SourceRow {
    /// Build a row, deriving the case count from the unit count.
    pub fn from_units(
        product_code: impl Into<String>,
        quantity_units: f64,
        units_per_case: Option<f64>,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            quantity_units,
            quantity_cases: cases_for(quantity_units, units_per_case),
        }
    }

    /// Attach the id of the source this row came from.
    pub fn tag(self, source_id: &str) -> StockRow {
        StockRow {
            product_code: self.product_code,
            quantity_units: self.quantity_units,
            quantity_cases: self.quantity_cases,
            source_id: source_id.to_string(),
        }
    }
}

/// A stock row tagged with its origin source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub product_code: String,
    pub quantity_units: f64,
    pub quantity_cases: i64,
    pub source_id: String,
}

/// Merged rows from every source that returned something.
///
/// Row order is the order in which sources completed, which is not stable
/// across runs. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateResult {
    rows: Vec<StockRow>,
}

impl AggregateResult {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one source's rows, stamping each with `source_id`.
    pub fn extend_from_source(&mut self, source_id: &str, rows: Vec<SourceRow>) {
        self.rows
            .extend(rows.into_iter().map(|row| row.tag(source_id)));
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<StockRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StockRow> {
        self.rows.iter()
    }

    /// Distinct source ids present, in first-seen order.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !ids.contains(&row.source_id.as_str()) {
                ids.push(&row.source_id);
            }
        }
        ids
    }

    /// Sum of units across every row.
    pub fn total_units(&self) -> f64 {
        self.rows.iter().map(|r| r.quantity_units).sum()
    }
}

impl From<Vec<StockRow>> for AggregateResult {
    fn from(rows: Vec<StockRow>) -> Self {
        Self { rows }
    }
}
