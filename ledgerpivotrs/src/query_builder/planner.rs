use crate::catalog::PivotCatalog;
use crate::error::{PivotError, Result};
use crate::models::{PivotRequest, MAX_LEVELS};
use crate::params::SqlParam;
use crate::sql_ast::{
    GroupBy, Literal, OrderItem, SelectItem, SelectQuery, SortDirection, SqlBinaryOperator, SqlExpr,
    TableRef,
};

use super::binder::ParamBinder;
use super::filters::apply_filters;
use super::grouping::{level_expr, prefix_grouping_sets};
use super::{dimension_alias, LEVEL_COLUMN, VALUE_COLUMN};

pub(crate) struct PlannedPivot {
    pub query: SelectQuery,
    pub params: Vec<SqlParam>,
}

pub(crate) fn build_query(
    catalog: &PivotCatalog,
    view: &TableRef,
    request: &PivotRequest,
) -> Result<PlannedPivot> {
    if request.levels.len() > MAX_LEVELS {
        return Err(PivotError::TooManyLevels {
            requested: request.levels.len(),
            max: MAX_LEVELS,
        });
    }

    let mut binder = ParamBinder::new();

    let kinds = request.base_dataset.kind_values(request.record_kind)?;
    let kind_column = catalog.kind_column();
    match kinds {
        [single] => binder.push(SqlExpr::binary(
            SqlBinaryOperator::Eq,
            kind_column,
            SqlExpr::Literal(Literal::Text(*single)),
        )),
        many => binder.push(SqlExpr::InList {
            expr: Box::new(kind_column),
            list: many
                .iter()
                .map(|k| SqlExpr::Literal(Literal::Text(*k)))
                .collect(),
            negated: false,
        }),
    }

    let date_column = catalog.resolve_date_column(request.effective_date_column())?;
    apply_filters(
        catalog,
        request.base_dataset,
        &date_column,
        &request.filters,
        &mut binder,
    )?;

    let dims = request
        .levels
        .iter()
        .map(|level| {
            catalog.resolve_dimension(&level.dimension, level.grain.or(request.date_grain))
        })
        .collect::<Result<Vec<_>>>()?;
    for (idx, dim) in dims.iter().enumerate() {
        if dims[..idx].contains(dim) {
            return Err(PivotError::InvalidRequest(format!(
                "level {} repeats dimension {}",
                idx + 1,
                request.levels[idx].dimension
            )));
        }
    }

    let measure = catalog.resolve_measure(&request.measure)?;

    let (filters, params) = binder.finish();

    let mut select = vec![SelectItem {
        expr: level_expr(&dims),
        alias: Some(LEVEL_COLUMN.to_string()),
    }];
    for idx in 0..MAX_LEVELS {
        select.push(SelectItem {
            expr: dims.get(idx).cloned().unwrap_or_else(SqlExpr::null_text),
            alias: Some(dimension_alias(idx)),
        });
    }
    select.push(SelectItem {
        expr: measure,
        alias: Some(VALUE_COLUMN.to_string()),
    });

    let group_by = if dims.is_empty() {
        GroupBy::None
    } else {
        GroupBy::GroupingSets(prefix_grouping_sets(&dims))
    };

    // Subtotals and business nulls share NULL labels, so both sort after populated
    // labels; the level-0 total lands after every populated first label, ahead of
    // the blank first label's rows.
    let mut order_by: Vec<OrderItem> = (0..dims.len())
        .map(|idx| OrderItem {
            expr: SqlExpr::column(dimension_alias(idx)),
            direction: SortDirection::Asc,
            nulls_last: true,
        })
        .collect();
    order_by.push(OrderItem {
        expr: SqlExpr::column(LEVEL_COLUMN),
        direction: SortDirection::Asc,
        nulls_last: false,
    });
    order_by.push(OrderItem {
        expr: SqlExpr::column(VALUE_COLUMN),
        direction: SortDirection::Desc,
        nulls_last: false,
    });

    Ok(PlannedPivot {
        query: SelectQuery {
            select,
            from: view.clone(),
            filters,
            group_by,
            order_by,
        },
        params,
    })
}
