//! Dimension/measure whitelist.
//!
//! The catalog is the only path from a caller-supplied name to SQL. It is built once,
//! never mutated, and handed to the query builder explicitly.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use crate::error::{PivotError, Result};
use crate::models::{BaseDataset, DateColumn, TimeGrain};
use crate::sql_ast::{Function, SqlExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    Text,
    Integer,
    /// Grouped as a truncated, formatted label.
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionDef {
    pub column: String,
    pub kind: DimensionKind,
    /// Whether the dimension may also be used as an equality filter key.
    pub filterable: bool,
}

impl DimensionDef {
    pub fn text(column: &str) -> Self {
        Self {
            column: column.to_string(),
            kind: DimensionKind::Text,
            filterable: true,
        }
    }

    pub fn integer(column: &str) -> Self {
        Self {
            column: column.to_string(),
            kind: DimensionKind::Integer,
            filterable: true,
        }
    }

    pub fn date(column: &str) -> Self {
        Self {
            column: column.to_string(),
            kind: DimensionKind::Date,
            filterable: false,
        }
    }

    pub fn group_only(mut self) -> Self {
        self.filterable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    CountDistinct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureDef {
    pub agg: Aggregation,
    pub column: String,
}

impl MeasureDef {
    pub fn sum(column: &str) -> Self {
        Self {
            agg: Aggregation::Sum,
            column: column.to_string(),
        }
    }

    pub fn count_distinct(column: &str) -> Self {
        Self {
            agg: Aggregation::CountDistinct,
            column: column.to_string(),
        }
    }
}

/// Filter keys that are not dimensions.
pub const DATE_FROM: &str = "date_from";
pub const DATE_TO: &str = "date_to";
pub const VALUE_MIN: &str = "value_min";
pub const VALUE_MAX: &str = "value_max";
pub const SEARCH: &str = "q";

pub const RESERVED_FILTERS: [&str; 5] = [DATE_FROM, DATE_TO, VALUE_MIN, VALUE_MAX, SEARCH];

static LEDGER: Lazy<PivotCatalog> = Lazy::new(PivotCatalog::ledger);

#[derive(Debug, Clone)]
pub struct PivotCatalog {
    dimensions: BTreeMap<String, DimensionDef>,
    measures: BTreeMap<String, MeasureDef>,
    kind_column: String,
    amount_column: String,
    search_columns: HashMap<BaseDataset, Vec<String>>,
}

impl PivotCatalog {
    /// Assemble a catalog from explicit definitions.
    ///
    /// `amount_column` backs the `value_min`/`value_max` filters and `kind_column`
    /// holds the record-kind discriminator.
    pub fn from_parts(
        dimensions: Vec<(&str, DimensionDef)>,
        measures: Vec<(&str, MeasureDef)>,
        kind_column: &str,
        amount_column: &str,
        search_columns: Vec<(BaseDataset, Vec<&str>)>,
    ) -> Self {
        Self {
            dimensions: dimensions
                .into_iter()
                .map(|(name, def)| (name.to_string(), def))
                .collect(),
            measures: measures
                .into_iter()
                .map(|(name, def)| (name.to_string(), def))
                .collect(),
            kind_column: kind_column.to_string(),
            amount_column: amount_column.to_string(),
            search_columns: search_columns
                .into_iter()
                .map(|(ds, cols)| (ds, cols.into_iter().map(str::to_string).collect()))
                .collect(),
        }
    }

    /// The ledger transaction view whitelist.
    pub fn ledger() -> Self {
        Self::from_parts(
            vec![
                // parties and registries
                ("customer_name", DimensionDef::text("customer_name")),
                ("supplier_name", DimensionDef::text("supplier_name")),
                ("category_name", DimensionDef::text("category_name")),
                ("nature_name", DimensionDef::text("nature_name")),
                ("branch_name", DimensionDef::text("branch_name")),
                ("department_name", DimensionDef::text("department_name")),
                ("cost_center_name", DimensionDef::text("cost_center_name")),
                ("profit_center_name", DimensionDef::text("profit_center_name")),
                ("project_name", DimensionDef::text("project_name")),
                // treasury
                ("payment_method_name", DimensionDef::text("payment_method_name")),
                ("financial_account_name", DimensionDef::text("financial_account_name")),
                ("bank_name", DimensionDef::text("bank_name")),
                ("bank_number", DimensionDef::text("bank_number")),
                // status and type
                ("status", DimensionDef::text("status")),
                ("line_status", DimensionDef::text("line_status")),
                ("kind", DimensionDef::text("kind").group_only()),
                ("line_kind", DimensionDef::text("line_kind")),
                ("installment_number", DimensionDef::integer("installment_number")),
                // dates
                ("posting_date", DimensionDef::date("posting_date")),
                ("due_date", DimensionDef::date("due_date")),
                ("payment_date", DimensionDef::date("line_payment_date")),
            ],
            vec![
                ("net_amount", MeasureDef::sum("net_amount")),
                ("gross_amount", MeasureDef::sum("gross_amount")),
                ("interest", MeasureDef::sum("interest")),
                ("fine", MeasureDef::sum("fine")),
                ("discount", MeasureDef::sum("discount")),
                ("document_count", MeasureDef::count_distinct("document_id")),
                ("line_count", MeasureDef::count_distinct("line_id")),
            ],
            "kind",
            "net_amount",
            vec![
                (BaseDataset::LedgerDocuments, vec!["description", "notes"]),
                (
                    BaseDataset::LedgerPayments,
                    vec!["description", "notes", "line_notes"],
                ),
            ],
        )
    }

    /// Process-wide ledger catalog, built on first use.
    pub fn shared() -> &'static PivotCatalog {
        &LEDGER
    }

    pub fn dimension(&self, name: &str) -> Result<&DimensionDef> {
        self.dimensions
            .get(name)
            .ok_or_else(|| PivotError::UnknownDimension(name.to_string()))
    }

    pub fn measure(&self, name: &str) -> Result<&MeasureDef> {
        self.measures
            .get(name)
            .ok_or_else(|| PivotError::UnknownMeasure(name.to_string()))
    }

    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    pub fn measure_names(&self) -> impl Iterator<Item = &str> {
        self.measures.keys().map(String::as_str)
    }

    /// Every key accepted in a request's filter map.
    pub fn filter_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = RESERVED_FILTERS.to_vec();
        fields.extend(
            self.dimensions
                .iter()
                .filter(|(_, def)| def.filterable)
                .map(|(name, _)| name.as_str()),
        );
        fields
    }

    /// Resolve a dimension to its grouping expression.
    ///
    /// Date dimensions become a sortable label (`YYYY-MM`, or `YYYY` for the year grain);
    /// everything else is a plain column and ignores `grain`.
    pub fn resolve_dimension(&self, name: &str, grain: Option<TimeGrain>) -> Result<SqlExpr> {
        let def = self.dimension(name)?;
        Ok(match def.kind {
            DimensionKind::Date => date_label(&def.column, grain.unwrap_or_default()),
            DimensionKind::Text | DimensionKind::Integer => SqlExpr::column(&def.column),
        })
    }

    /// Resolve a measure to its single aggregate expression, cast to `double precision`.
    pub fn resolve_measure(&self, name: &str) -> Result<SqlExpr> {
        let def = self.measure(name)?;
        let agg = SqlExpr::Aggregate {
            agg: def.agg,
            expr: Box::new(SqlExpr::column(&def.column)),
        };
        Ok(SqlExpr::cast(agg, "double precision"))
    }

    /// Raw column behind a semantic date column.
    pub fn resolve_date_column(&self, date_column: DateColumn) -> Result<SqlExpr> {
        let name = date_column.dimension_name();
        let def = self.dimension(name)?;
        if def.kind != DimensionKind::Date {
            return Err(PivotError::InvalidRequest(format!(
                "{name} is not a date column"
            )));
        }
        Ok(SqlExpr::column(&def.column))
    }

    /// Dimension an equality filter key targets.
    pub fn filter_target(&self, name: &str) -> Result<&DimensionDef> {
        match self.dimensions.get(name) {
            Some(def) if def.filterable => Ok(def),
            _ => Err(PivotError::UnknownFilterField(name.to_string())),
        }
    }

    pub fn kind_column(&self) -> SqlExpr {
        SqlExpr::column(&self.kind_column)
    }

    pub fn amount_column(&self) -> SqlExpr {
        SqlExpr::column(&self.amount_column)
    }

    pub fn search_columns(&self, dataset: BaseDataset) -> &[String] {
        self.search_columns
            .get(&dataset)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn date_label(column: &str, grain: TimeGrain) -> SqlExpr {
    let format = match grain {
        TimeGrain::Month => "YYYY-MM",
        TimeGrain::Year => "YYYY",
    };
    SqlExpr::Function {
        func: Function::ToChar {
            format: format.to_string(),
        },
        args: vec![SqlExpr::Function {
            func: Function::DateTrunc(grain),
            args: vec![SqlExpr::column(column)],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::sql_ast::SqlRenderer;

    fn render(expr: &SqlExpr) -> String {
        SqlRenderer::new(&PostgresDialect).render_expr(expr)
    }

    #[test]
    fn date_dimension_defaults_to_month() {
        let catalog = PivotCatalog::ledger();
        let expr = catalog.resolve_dimension("due_date", None).unwrap();
        assert_eq!(
            render(&expr),
            "to_char(date_trunc('month', \"due_date\"), 'YYYY-MM')"
        );
    }

    #[test]
    fn date_dimension_year_grain() {
        let catalog = PivotCatalog::ledger();
        let expr = catalog
            .resolve_dimension("payment_date", Some(TimeGrain::Year))
            .unwrap();
        assert_eq!(
            render(&expr),
            "to_char(date_trunc('year', \"line_payment_date\"), 'YYYY')"
        );
    }

    #[test]
    fn text_dimension_ignores_grain() {
        let catalog = PivotCatalog::ledger();
        let expr = catalog
            .resolve_dimension("supplier_name", Some(TimeGrain::Year))
            .unwrap();
        assert_eq!(expr, SqlExpr::column("supplier_name"));
    }

    #[test]
    fn unknown_names_rejected() {
        let catalog = PivotCatalog::ledger();
        assert!(matches!(
            catalog.resolve_dimension("password", None),
            Err(PivotError::UnknownDimension(name)) if name == "password"
        ));
        assert!(matches!(
            catalog.resolve_measure("avg_salary"),
            Err(PivotError::UnknownMeasure(_))
        ));
        assert!(matches!(
            catalog.filter_target("due_date"),
            Err(PivotError::UnknownFilterField(_))
        ));
        assert!(matches!(
            catalog.filter_target("kind"),
            Err(PivotError::UnknownFilterField(_))
        ));
    }

    #[test]
    fn measures_render_single_aggregate() {
        let catalog = PivotCatalog::ledger();
        assert_eq!(
            render(&catalog.resolve_measure("document_count").unwrap()),
            "CAST(COUNT(DISTINCT \"document_id\") AS double precision)"
        );
        assert_eq!(
            render(&catalog.resolve_measure("net_amount").unwrap()),
            "CAST(SUM(\"net_amount\") AS double precision)"
        );
    }

    #[test]
    fn search_columns_per_dataset() {
        let catalog = PivotCatalog::shared();
        assert_eq!(
            catalog.search_columns(BaseDataset::LedgerDocuments),
            &["description".to_string(), "notes".to_string()]
        );
        assert_eq!(catalog.search_columns(BaseDataset::LedgerPayments).len(), 3);
    }

    #[test]
    fn filter_fields_include_reserved_names() {
        let catalog = PivotCatalog::ledger();
        let fields = catalog.filter_fields();
        assert!(fields.contains(&"q"));
        assert!(fields.contains(&"supplier_name"));
        assert!(!fields.contains(&"due_date"));
        assert!(!fields.contains(&"kind"));
    }

    #[test]
    fn every_date_column_resolves() {
        let catalog = PivotCatalog::ledger();
        for col in [
            DateColumn::PostingDate,
            DateColumn::DueDate,
            DateColumn::PaymentDate,
        ] {
            catalog.resolve_date_column(col).unwrap();
        }
    }
}
