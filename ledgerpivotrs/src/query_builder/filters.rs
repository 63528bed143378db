use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::catalog::{
    DimensionKind, PivotCatalog, DATE_FROM, DATE_TO, SEARCH, VALUE_MAX, VALUE_MIN,
};
use crate::error::{PivotError, Result};
use crate::models::BaseDataset;
use crate::params::SqlParam;
use crate::sql_ast::{SqlBinaryOperator, SqlExpr};

use super::binder::ParamBinder;

/// Bind the request's filter map onto `binder`.
///
/// Date bounds go first, then every other key in name order. Null values and blank
/// strings are treated as unset.
pub(crate) fn apply_filters(
    catalog: &PivotCatalog,
    dataset: BaseDataset,
    date_column: &SqlExpr,
    filters: &BTreeMap<String, Value>,
    binder: &mut ParamBinder,
) -> Result<()> {
    for (key, op) in [(DATE_FROM, SqlBinaryOperator::Gte), (DATE_TO, SqlBinaryOperator::Lte)] {
        if let Some(value) = filters.get(key) {
            if let Some(date) = date_value(key, value)? {
                binder.compare(date_column.clone(), op, SqlParam::Date(date));
            }
        }
    }

    for (key, value) in filters {
        match key.as_str() {
            DATE_FROM | DATE_TO => {}
            VALUE_MIN => bind_amount(catalog, key, value, SqlBinaryOperator::Gte, binder)?,
            VALUE_MAX => bind_amount(catalog, key, value, SqlBinaryOperator::Lte, binder)?,
            SEARCH => bind_search(catalog, dataset, value, binder)?,
            field => bind_dimension(catalog, field, value, binder)?,
        }
    }
    Ok(())
}

fn date_value(key: &str, value: &Value) -> Result<Option<NaiveDate>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                PivotError::InvalidRequest(format!("{key} must be a YYYY-MM-DD date: {e}"))
            }),
        _ => Err(PivotError::InvalidRequest(format!(
            "{key} must be a date string"
        ))),
    }
}

fn bind_amount(
    catalog: &PivotCatalog,
    key: &str,
    value: &Value,
    op: SqlBinaryOperator,
    binder: &mut ParamBinder,
) -> Result<()> {
    match value {
        Value::Null => Ok(()),
        Value::Number(n) => {
            let amount = n.as_f64().ok_or_else(|| {
                PivotError::InvalidRequest(format!("{key} is not a finite number"))
            })?;
            binder.compare(catalog.amount_column(), op, SqlParam::Number(amount));
            Ok(())
        }
        _ => Err(PivotError::InvalidRequest(format!("{key} must be a number"))),
    }
}

fn bind_search(
    catalog: &PivotCatalog,
    dataset: BaseDataset,
    value: &Value,
    binder: &mut ParamBinder,
) -> Result<()> {
    let term = match value {
        Value::Null => return Ok(()),
        Value::String(s) => s.trim(),
        _ => {
            return Err(PivotError::InvalidRequest(format!(
                "{SEARCH} must be a string"
            )))
        }
    };
    let columns = catalog.search_columns(dataset);
    if term.is_empty() || columns.is_empty() {
        return Ok(());
    }
    let pattern = format!("%{term}%");
    let alternatives = columns
        .iter()
        .map(|col| {
            let param = binder.bind(SqlParam::Text(pattern.clone()));
            SqlExpr::binary(SqlBinaryOperator::ILike, SqlExpr::column(col), param)
        })
        .collect();
    binder.push(SqlExpr::AnyOf(alternatives));
    Ok(())
}

fn bind_dimension(
    catalog: &PivotCatalog,
    field: &str,
    value: &Value,
    binder: &mut ParamBinder,
) -> Result<()> {
    let def = catalog.filter_target(field)?;
    let target = SqlExpr::column(&def.column);

    let mut values = match value {
        Value::Null => return Ok(()),
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_param(field, def.kind, item))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>(),
        scalar => scalar_param(field, def.kind, scalar)?.into_iter().collect(),
    };

    match values.len() {
        0 => {}
        1 => {
            if let Some(param) = values.pop() {
                binder.compare(target, SqlBinaryOperator::Eq, param);
            }
        }
        _ => {
            let list = values.into_iter().map(|v| binder.bind(v)).collect();
            binder.push(SqlExpr::InList {
                expr: Box::new(target),
                list,
                negated: false,
            });
        }
    }
    Ok(())
}

fn scalar_param(field: &str, kind: DimensionKind, value: &Value) -> Result<Option<SqlParam>> {
    match (kind, value) {
        (_, Value::Null) => Ok(None),
        (DimensionKind::Text, Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| SqlParam::Text(trimmed.to_string())))
        }
        (DimensionKind::Integer, Value::Number(n)) => n
            .as_i64()
            .map(|i| Some(SqlParam::Integer(i)))
            .ok_or_else(|| PivotError::InvalidRequest(format!("{field} must be an integer"))),
        (DimensionKind::Text, _) => Err(PivotError::InvalidRequest(format!(
            "{field} must be a string"
        ))),
        (DimensionKind::Integer, _) => Err(PivotError::InvalidRequest(format!(
            "{field} must be an integer"
        ))),
        (DimensionKind::Date, _) => Err(PivotError::UnknownFilterField(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(filters: Value) -> Result<(Vec<SqlExpr>, Vec<SqlParam>)> {
        let catalog = PivotCatalog::ledger();
        let filters: BTreeMap<String, Value> = serde_json::from_value(filters).unwrap();
        let mut binder = ParamBinder::new();
        apply_filters(
            &catalog,
            BaseDataset::LedgerDocuments,
            &SqlExpr::column("due_date"),
            &filters,
            &mut binder,
        )?;
        Ok(binder.finish())
    }

    #[test]
    fn date_bounds_bind_first() {
        let (predicates, params) = run(json!({
            "bank_name": "First",
            "date_to": "2025-01-31",
            "date_from": "2025-01-01",
        }))
        .unwrap();
        assert_eq!(predicates.len(), 3);
        assert_eq!(
            params,
            vec![
                SqlParam::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
                SqlParam::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
                SqlParam::Text("First".into()),
            ]
        );
    }

    #[test]
    fn blank_and_null_values_are_unset() {
        let (predicates, params) = run(json!({
            "supplier_name": "   ",
            "status": null,
            "q": "",
            "project_name": [],
        }))
        .unwrap();
        assert!(predicates.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn text_values_are_trimmed() {
        let (_, params) = run(json!({"status": "  open "})).unwrap();
        assert_eq!(params, vec![SqlParam::Text("open".into())]);
    }

    #[test]
    fn search_binds_one_pattern_per_column() {
        let (predicates, params) = run(json!({"q": " rent "})).unwrap();
        assert_eq!(predicates.len(), 1);
        assert!(matches!(&predicates[0], SqlExpr::AnyOf(items) if items.len() == 2));
        assert_eq!(
            params,
            vec![
                SqlParam::Text("%rent%".into()),
                SqlParam::Text("%rent%".into())
            ]
        );
    }

    #[test]
    fn array_values_become_in_list() {
        let (predicates, params) = run(json!({"branch_name": ["North", "South"]})).unwrap();
        assert!(matches!(&predicates[0], SqlExpr::InList { list, .. } if list.len() == 2));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(matches!(
            run(json!({"date_from": "01/02/2025"})),
            Err(PivotError::InvalidRequest(_))
        ));
        assert!(matches!(
            run(json!({"value_min": "10"})),
            Err(PivotError::InvalidRequest(_))
        ));
        assert!(matches!(
            run(json!({"installment_number": 1.5})),
            Err(PivotError::InvalidRequest(_))
        ));
        assert!(matches!(
            run(json!({"supplier_name": 7})),
            Err(PivotError::InvalidRequest(_))
        ));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(
            run(json!({"salary": "1"})),
            Err(PivotError::UnknownFilterField(name)) if name == "salary"
        ));
    }

    #[test]
    fn numeric_filters() {
        let (_, params) = run(json!({"installment_number": 2, "value_min": 100})).unwrap();
        assert_eq!(params, vec![SqlParam::Integer(2), SqlParam::Number(100.0)]);
    }
}
