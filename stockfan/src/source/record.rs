//! Stock export records shared by the snapshot and HTTP adapters.
//!
//! Both backends deliver per-location stock lines as JSON:
//!
//! ```json
//! [{ "code": "LV227", "units": 12, "unitsPerCase": 6 }]
//! ```
//!
//! A code may appear on several lines (one per shelf or warehouse bin).
//! Lines are summed per code before case counts are derived.

use std::collections::HashMap;

use serde::Deserialize;

use crate::model::SourceRow;
use crate::query::StockFilter;
use crate::source::SourceError;

/// One raw stock line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub code: String,
    pub units: f64,
    #[serde(default)]
    pub units_per_case: Option<f64>,
}

/// Parse a JSON array of stock lines.
pub fn parse_records(bytes: &[u8]) -> Result<Vec<StockRecord>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Filter lines, sum units per code and derive cases.
///
/// Output keeps the order in which each code was first seen. The pack size
/// of the first line carrying one wins.
pub fn collect_rows(records: &[StockRecord], filter: &StockFilter) -> Vec<SourceRow> {
    let mut grouped: Vec<(&str, f64, Option<f64>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| filter.matches(&r.code)) {
        match index.get(record.code.as_str()).copied() {
            Some(slot) => {
                let (_, units, per_case) = &mut grouped[slot];
                *units += record.units;
                if per_case.is_none() {
                    *per_case = record.units_per_case;
                }
            }
            None => {
                index.insert(record.code.as_str(), grouped.len());
                grouped.push((record.code.as_str(), record.units, record.units_per_case));
            }
        }
    }

    grouped
        .into_iter()
        .map(|(code, units, per_case)| SourceRow::from_units(code, units, per_case))
        .collect()
}

/// Parse and collect in one step, mapping parse failures to query errors.
pub(crate) fn rows_from_json(
    bytes: &[u8],
    filter: &StockFilter,
) -> Result<Vec<SourceRow>, SourceError> {
    let records = parse_records(bytes)
        .map_err(|e| SourceError::Query(format!("invalid stock payload: {}", e)))?;
    Ok(collect_rows(&records, filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::MatchMode;

    fn filter(code: &str, mode: MatchMode) -> StockFilter {
        StockFilter {
            code: code.to_string(),
            mode,
        }
    }

    #[test]
    fn test_parse_records_optional_pack_size() {
        let records =
            parse_records(br#"[{"code":"A","units":5},{"code":"B","units":7,"unitsPerCase":2}]"#)
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].units_per_case, None);
        assert_eq!(records[1].units_per_case, Some(2.0));
    }

    #[test]
    fn test_collect_rows_sums_per_code() {
        let records = vec![
            StockRecord {
                code: "LV227".to_string(),
                units: 4.0,
                units_per_case: Some(3.0),
            },
            StockRecord {
                code: "LV100".to_string(),
                units: 9.0,
                units_per_case: None,
            },
            StockRecord {
                code: "LV227".to_string(),
                units: 6.0,
                units_per_case: Some(3.0),
            },
        ];

        let rows = collect_rows(&records, &filter("LV227", MatchMode::Exact));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity_units, 10.0);
        assert_eq!(rows[0].quantity_cases, 3);
    }

    #[test]
    fn test_collect_rows_contains_keeps_first_seen_order() {
        let records = vec![
            StockRecord {
                code: "XB2".to_string(),
                units: 1.0,
                units_per_case: None,
            },
            StockRecord {
                code: "XA2".to_string(),
                units: 2.0,
                units_per_case: None,
            },
            StockRecord {
                code: "Y3".to_string(),
                units: 3.0,
                units_per_case: None,
            },
        ];

        let rows = collect_rows(&records, &filter("2", MatchMode::Contains));
        let codes: Vec<_> = rows.iter().map(|r| r.product_code.as_str()).collect();
        assert_eq!(codes, vec!["XB2", "XA2"]);
    }

    #[test]
    fn test_collect_rows_large_export_groups_interleaved_codes() {
        let records: Vec<StockRecord> = (0..20_000)
            .map(|i| StockRecord {
                code: format!("SKU-{}", i % 5_000),
                units: 1.0,
                units_per_case: (i >= 5_000).then_some(2.0),
            })
            .collect();

        let rows = collect_rows(&records, &filter("1", MatchMode::Contains));
        let expected = (0..5_000).filter(|i| i.to_string().contains('1')).count();

        assert_eq!(rows.len(), expected);
        assert_eq!(rows[0].product_code, "SKU-1");
        assert!(rows.iter().all(|r| r.quantity_units == 4.0));
        assert!(rows.iter().all(|r| r.quantity_cases == 2));
    }

    #[test]
    fn test_rows_from_json_rejects_garbage() {
        let result = rows_from_json(b"not json", &filter("X", MatchMode::Contains));
        assert!(matches!(result, Err(SourceError::Query(_))));
    }
}
