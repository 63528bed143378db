//! Pivot SQL generation.
//!
//! A [`PivotRequest`] becomes one `SELECT` over the fact view with the filter values
//! bound as positional parameters and the requested levels rolled up through prefix
//! `GROUPING SETS`. Output columns are fixed: `level`, `dim_1`..`dim_5`, `value`.

use crate::catalog::PivotCatalog;
use crate::config::PivotConfig;
use crate::dialect::{Dialect, PostgresDialect};
use crate::error::Result;
use crate::models::{PivotRequest, MAX_LEVELS};
use crate::params::SqlParam;
use crate::sql_ast::{SqlRenderer, TableRef};

mod binder;
mod filters;
mod grouping;
mod planner;

pub const LEVEL_COLUMN: &str = "level";
pub const VALUE_COLUMN: &str = "value";

/// Output alias of the zero-based dimension position `idx`.
pub fn dimension_alias(idx: usize) -> String {
    debug_assert!(idx < MAX_LEVELS);
    format!("dim_{}", idx + 1)
}

/// Rendered SQL plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotSql {
    pub sql: String,
    pub params: Vec<SqlParam>,
    /// Number of requested levels; dimension columns past this are always null.
    pub level_count: usize,
}

pub struct PivotQueryBuilder<'c> {
    catalog: &'c PivotCatalog,
    view: TableRef,
}

impl<'c> PivotQueryBuilder<'c> {
    pub fn new(catalog: &'c PivotCatalog, view: TableRef) -> Self {
        Self { catalog, view }
    }

    /// Builder over the fact view named in `config`.
    pub fn from_config(catalog: &'c PivotCatalog, config: &PivotConfig) -> Self {
        Self::new(catalog, config.view.table_ref())
    }

    pub fn catalog(&self) -> &PivotCatalog {
        self.catalog
    }

    /// Build PostgreSQL text for a request.
    pub fn build(&self, request: &PivotRequest) -> Result<PivotSql> {
        self.build_with_dialect(request, &PostgresDialect)
    }

    /// Build SQL using a provided dialect (useful for tests).
    pub fn build_with_dialect(
        &self,
        request: &PivotRequest,
        dialect: &dyn Dialect,
    ) -> Result<PivotSql> {
        let planned = planner::build_query(self.catalog, &self.view, request)?;
        let sql = SqlRenderer::new(dialect).render_select(&planned.query);

        tracing::debug!(
            levels = request.levels.len(),
            params = planned.params.len(),
            sql_len = sql.len(),
            "built pivot query"
        );
        tracing::trace!(sql = %sql, "pivot sql");

        Ok(PivotSql {
            sql,
            params: planned.params,
            level_count: request.levels.len(),
        })
    }
}
