use crate::catalog::Aggregation;
use crate::dialect::Dialect;
use crate::models::TimeGrain;
use crate::params::ParamType;

#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    DateTrunc(TimeGrain),
    ToChar { format: String },
}

/// Constants rendered inline: NULL, level numbers and fixed kind discriminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    Integer(i64),
    Text(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column {
        name: String,
    },
    Literal(Literal),
    /// Positional placeholder; `index` is zero-based.
    Param {
        index: usize,
        ty: ParamType,
    },
    Function {
        func: Function,
        args: Vec<SqlExpr>,
    },
    Aggregate {
        agg: Aggregation,
        expr: Box<SqlExpr>,
    },
    Cast {
        expr: Box<SqlExpr>,
        data_type: String,
    },
    Grouping(Box<SqlExpr>),
    BinaryOp {
        op: SqlBinaryOperator,
        left: Box<SqlExpr>,
        right: Box<SqlExpr>,
    },
    InList {
        expr: Box<SqlExpr>,
        list: Vec<SqlExpr>,
        negated: bool,
    },
    /// Parenthesised disjunction.
    AnyOf(Vec<SqlExpr>),
}

impl SqlExpr {
    pub fn column(name: impl Into<String>) -> Self {
        SqlExpr::Column { name: name.into() }
    }

    pub fn binary(op: SqlBinaryOperator, left: SqlExpr, right: SqlExpr) -> Self {
        SqlExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn cast(expr: SqlExpr, data_type: impl Into<String>) -> Self {
        SqlExpr::Cast {
            expr: Box::new(expr),
            data_type: data_type.into(),
        }
    }

    /// `NULL` typed as text, used to pad unrequested dimension columns.
    pub fn null_text() -> Self {
        SqlExpr::cast(SqlExpr::Literal(Literal::Null), "text")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlBinaryOperator {
    Add,
    Subtract,
    Eq,
    Gte,
    Lte,
    ILike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: SqlExpr,
    pub alias: Option<String>,
}

/// Relation the pivot reads from, optionally schema-qualified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: SqlExpr,
    pub direction: SortDirection,
    pub nulls_last: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GroupBy {
    #[default]
    None,
    /// Each inner list is one grouping set; an empty list is the grand total.
    GroupingSets(Vec<Vec<SqlExpr>>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub select: Vec<SelectItem>,
    pub from: TableRef,
    pub filters: Vec<SqlExpr>,
    pub group_by: GroupBy,
    pub order_by: Vec<OrderItem>,
}

pub struct SqlRenderer<'d> {
    dialect: &'d dyn Dialect,
}

impl<'d> SqlRenderer<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self { dialect }
    }

    pub fn render_select(&self, query: &SelectQuery) -> String {
        let select_items: Vec<String> = query
            .select
            .iter()
            .map(|item| {
                let expr_sql = self.render_expr(&item.expr);
                match &item.alias {
                    Some(alias) => format!("{expr_sql} AS {}", self.dialect.quote_ident(alias)),
                    None => expr_sql,
                }
            })
            .collect();

        let mut sql = format!(
            "SELECT {} FROM {}",
            select_items.join(", "),
            self.render_table_ref(&query.from)
        );

        if !query.filters.is_empty() {
            let filters: Vec<String> = query.filters.iter().map(|f| self.render_expr(f)).collect();
            sql.push_str(&format!(" WHERE {}", filters.join(" AND ")));
        }

        match &query.group_by {
            GroupBy::None => {}
            GroupBy::GroupingSets(sets) => {
                let rendered: Vec<String> = sets
                    .iter()
                    .map(|set| {
                        let exprs: Vec<String> = set.iter().map(|e| self.render_expr(e)).collect();
                        format!("({})", exprs.join(", "))
                    })
                    .collect();
                sql.push_str(&format!(" GROUP BY GROUPING SETS ({})", rendered.join(", ")));
            }
        }

        if !query.order_by.is_empty() {
            let orders: Vec<String> = query
                .order_by
                .iter()
                .map(|o| {
                    let expr = self.render_expr(&o.expr);
                    let dir = match o.direction {
                        SortDirection::Asc => "ASC",
                        SortDirection::Desc => "DESC",
                    };
                    if o.nulls_last {
                        format!("{expr} {dir} NULLS LAST")
                    } else {
                        format!("{expr} {dir}")
                    }
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }

        sql
    }

    fn render_table_ref(&self, table: &TableRef) -> String {
        match &table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.dialect.quote_ident(schema),
                self.dialect.quote_ident(&table.name)
            ),
            None => self.dialect.quote_ident(&table.name),
        }
    }

    pub fn render_expr(&self, expr: &SqlExpr) -> String {
        match expr {
            SqlExpr::Column { name } => self.dialect.quote_ident(name),
            SqlExpr::Literal(v) => self.dialect.render_literal(v),
            SqlExpr::Param { index, ty } => self.dialect.render_param(*index, *ty),
            SqlExpr::Function { func, args } => {
                let rendered_args: Vec<String> = args.iter().map(|a| self.render_expr(a)).collect();
                self.dialect.render_function(func, rendered_args)
            }
            SqlExpr::Aggregate { agg, expr } => self
                .dialect
                .render_aggregation(agg, &self.render_expr(expr)),
            SqlExpr::Cast { expr, data_type } => {
                format!("CAST({} AS {data_type})", self.render_expr(expr))
            }
            SqlExpr::Grouping(expr) => format!("GROUPING({})", self.render_expr(expr)),
            SqlExpr::BinaryOp { op, left, right } => {
                let op_sql = match op {
                    SqlBinaryOperator::Add => "+",
                    SqlBinaryOperator::Subtract => "-",
                    SqlBinaryOperator::Eq => "=",
                    SqlBinaryOperator::Gte => ">=",
                    SqlBinaryOperator::Lte => "<=",
                    SqlBinaryOperator::ILike => "ILIKE",
                };
                format!(
                    "({} {} {})",
                    self.render_expr(left),
                    op_sql,
                    self.render_expr(right)
                )
            }
            SqlExpr::InList {
                expr,
                list,
                negated,
            } => {
                let rendered_values: Vec<String> =
                    list.iter().map(|v| self.render_expr(v)).collect();
                let not_kw = if *negated { "NOT " } else { "" };
                format!(
                    "{} {}IN ({})",
                    self.render_expr(expr),
                    not_kw,
                    rendered_values.join(", ")
                )
            }
            SqlExpr::AnyOf(items) => {
                let rendered: Vec<String> = items.iter().map(|i| self.render_expr(i)).collect();
                format!("({})", rendered.join(" OR "))
            }
        }
    }
}
