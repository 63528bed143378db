//! PostgreSQL dialect implementation.

use crate::params::ParamType;
use crate::sql_ast::Function;

use super::{grain_to_str, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    fn param_type_name(ty: ParamType) -> &'static str {
        match ty {
            ParamType::Text => "text",
            ParamType::Integer => "int8",
            ParamType::Number => "float8",
            ParamType::Date => "date",
        }
    }
}

impl Dialect for PostgresDialect {
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn placeholder(&self, idx: usize) -> String {
        format!("${}", idx + 1) // PostgreSQL uses $1, $2, ...
    }

    // Explicit casts pin the parameter type so the wire encoding matches the bound value.
    fn render_param(&self, idx: usize, ty: ParamType) -> String {
        format!("{}::{}", self.placeholder(idx), Self::param_type_name(ty))
    }

    fn render_function(&self, func: &Function, args: Vec<String>) -> String {
        match func {
            Function::DateTrunc(grain) => {
                let unit = grain_to_str(grain);
                format!("date_trunc('{unit}', {})", args.join(", "))
            }
            Function::ToChar { format } => match args.as_slice() {
                [expr] => format!("to_char({expr}, '{}')", format.replace('\'', "''")),
                _ => "NULL".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeGrain;
    use crate::sql_ast::Literal;

    #[test]
    fn typed_placeholders_are_one_based() {
        let d = PostgresDialect;
        assert_eq!(d.render_param(0, ParamType::Date), "$1::date");
        assert_eq!(d.render_param(4, ParamType::Text), "$5::text");
    }

    #[test]
    fn renders_truncated_label() {
        let d = PostgresDialect;
        let trunc = d.render_function(
            &Function::DateTrunc(TimeGrain::Year),
            vec!["\"due_date\"".to_string()],
        );
        let label = d.render_function(
            &Function::ToChar {
                format: "YYYY".to_string(),
            },
            vec![trunc],
        );
        assert_eq!(label, "to_char(date_trunc('year', \"due_date\"), 'YYYY')");
    }

    #[test]
    fn renders_inline_constants() {
        let d = PostgresDialect;
        assert_eq!(d.render_literal(&Literal::Null), "NULL");
        assert_eq!(d.render_literal(&Literal::Integer(0)), "0");
        assert_eq!(d.render_literal(&Literal::Text("o'clock")), "'o''clock'");
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(PostgresDialect.quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
