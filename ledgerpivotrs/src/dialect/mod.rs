//! SQL dialect abstractions.
//!
//! The pivot targets PostgreSQL (`GROUPING SETS`, `GROUPING()`, `to_char`), so that is
//! the only dialect shipped; the trait keeps rendering swappable in tests.

use crate::catalog::Aggregation;
use crate::models::TimeGrain;
use crate::params::ParamType;
use crate::sql_ast::{Function, Literal};

/// Dialects render identifiers and primitive expression pieces.
/// Expression tree walking lives in the renderer; the dialect
/// only maps logical constructs to SQL fragments.
pub trait Dialect {
    fn quote_ident(&self, ident: &str) -> String;
    fn placeholder(&self, _idx: usize) -> String {
        "?".to_string()
    }
    fn render_param(&self, idx: usize, _ty: ParamType) -> String {
        self.placeholder(idx)
    }
    fn render_function(&self, func: &Function, args: Vec<String>) -> String;
    fn render_aggregation(&self, agg: &Aggregation, expr: &str) -> String {
        match agg {
            Aggregation::Sum => format!("SUM({expr})"),
            Aggregation::CountDistinct => format!("COUNT(DISTINCT {expr})"),
        }
    }
    fn render_literal(&self, value: &Literal) -> String {
        match value {
            Literal::Null => "NULL".to_string(),
            Literal::Integer(n) => n.to_string(),
            Literal::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }
}

pub(crate) fn grain_to_str(grain: &TimeGrain) -> &'static str {
    match grain {
        TimeGrain::Month => "month",
        TimeGrain::Year => "year",
    }
}

mod postgres;
pub use postgres::PostgresDialect;
