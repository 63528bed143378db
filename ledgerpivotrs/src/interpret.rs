//! Turns raw rollup rows into [`PivotResultRow`]s.
//!
//! With prefix grouping sets, a row at `level` n has exactly the first n dimension
//! columns populated. A `NULL` inside that prefix is a business null ([`DimensionSlot::Blank`]);
//! beyond it the slot is a subtotal ([`DimensionSlot::Rollup`]). Columns past the number of
//! requested levels are not applicable and are never read.

use serde_json::{Map, Value};

use crate::error::{PivotError, Result};
use crate::models::{DimensionSlot, PivotResultRow};
use crate::query_builder::{dimension_alias, LEVEL_COLUMN, VALUE_COLUMN};

pub fn interpret_rows(rows: &[Map<String, Value>], level_count: usize) -> Result<Vec<PivotResultRow>> {
    rows.iter().map(|row| interpret_row(row, level_count)).collect()
}

pub fn interpret_row(row: &Map<String, Value>, level_count: usize) -> Result<PivotResultRow> {
    let level = read_level(row)?;
    if level > level_count {
        return Err(PivotError::QueryExecution(format!(
            "row level {level} exceeds requested level count {level_count}"
        )));
    }

    let dimension_values = (0..level_count)
        .map(|idx| {
            if idx >= level {
                return DimensionSlot::Rollup;
            }
            match row.get(&dimension_alias(idx)) {
                None | Some(Value::Null) => DimensionSlot::Blank,
                Some(Value::String(s)) => DimensionSlot::Value(s.clone()),
                Some(other) => DimensionSlot::Value(other.to_string()),
            }
        })
        .collect();

    Ok(PivotResultRow {
        level,
        dimension_values,
        value: read_value(row)?,
    })
}

fn read_level(row: &Map<String, Value>) -> Result<usize> {
    match row.get(LEVEL_COLUMN) {
        None | Some(Value::Null) => Err(PivotError::QueryExecution(
            "missing level column".to_string(),
        )),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| PivotError::QueryExecution(format!("invalid level {n}"))),
        Some(Value::String(s)) => s
            .parse::<usize>()
            .map_err(|_| PivotError::QueryExecution(format!("invalid level {s}"))),
        Some(other) => Err(PivotError::QueryExecution(format!("invalid level {other}"))),
    }
}

// Aggregates over empty groups come back NULL; they read as zero.
fn read_value(row: &Map<String, Value>) -> Result<f64> {
    match row.get(VALUE_COLUMN) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PivotError::QueryExecution(format!("invalid value {n}"))),
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map_err(|_| PivotError::QueryExecution(format!("invalid value {s}"))),
        Some(other) => Err(PivotError::QueryExecution(format!("invalid value {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn grand_total_is_all_rollup() {
        let r = interpret_row(
            &row(json!({"level": 0, "dim_1": null, "dim_2": null, "value": 30.0})),
            2,
        )
        .unwrap();
        assert_eq!(r.level, 0);
        assert_eq!(
            r.dimension_values,
            vec![DimensionSlot::Rollup, DimensionSlot::Rollup]
        );
        assert_eq!(r.value, 30.0);
    }

    #[test]
    fn business_null_differs_from_rollup() {
        let r = interpret_row(
            &row(json!({"level": 1, "dim_1": null, "dim_2": null, "value": 5})),
            2,
        )
        .unwrap();
        assert_eq!(
            r.dimension_values,
            vec![DimensionSlot::Blank, DimensionSlot::Rollup]
        );
        assert_eq!(r.path(), vec!["—"]);
    }

    #[test]
    fn unrequested_columns_ignored() {
        let r = interpret_row(
            &row(json!({"level": 1, "dim_1": "ACME", "dim_2": "junk", "value": "12.5"})),
            1,
        )
        .unwrap();
        assert_eq!(r.dimension_values, vec![DimensionSlot::Value("ACME".into())]);
        assert_eq!(r.value, 12.5);
    }

    #[test]
    fn non_text_labels_stringified() {
        let r = interpret_row(&row(json!({"level": 1, "dim_1": 3, "value": 1})), 1).unwrap();
        assert_eq!(r.dimension_values, vec![DimensionSlot::Value("3".into())]);
    }

    #[test]
    fn null_value_reads_as_zero() {
        let r = interpret_row(&row(json!({"level": 0, "value": null})), 0).unwrap();
        assert_eq!(r.value, 0.0);
        assert!(r.dimension_values.is_empty());
    }

    #[test]
    fn missing_level_is_an_error() {
        for raw in [json!({"dim_1": "ACME", "value": 1}), json!({"level": null, "value": 1})] {
            let err = interpret_row(&row(raw), 1).unwrap_err();
            assert!(matches!(err, PivotError::QueryExecution(msg) if msg == "missing level column"));
        }
    }

    #[test]
    fn level_beyond_request_is_an_error() {
        let err = interpret_row(&row(json!({"level": 3, "value": 1})), 2).unwrap_err();
        assert!(matches!(err, PivotError::QueryExecution(_)));
    }
}
