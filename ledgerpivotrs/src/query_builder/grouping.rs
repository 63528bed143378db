use crate::sql_ast::{Literal, SqlBinaryOperator, SqlExpr};

/// Ordered prefixes of `dims`, from the empty set up to the full list.
///
/// `[a, b, c]` yields `(), (a), (a, b), (a, b, c)`: the grand total plus one subtotal
/// per drill-down depth. Non-prefix combinations are never produced.
pub(crate) fn prefix_grouping_sets(dims: &[SqlExpr]) -> Vec<Vec<SqlExpr>> {
    (0..=dims.len()).map(|n| dims[..n].to_vec()).collect()
}

/// Number of populated dimensions in a row: `sum(1 - GROUPING(d))`, or `0` when
/// nothing is grouped.
pub(crate) fn level_expr(dims: &[SqlExpr]) -> SqlExpr {
    dims.iter()
        .map(|d| {
            SqlExpr::binary(
                SqlBinaryOperator::Subtract,
                SqlExpr::Literal(Literal::Integer(1)),
                SqlExpr::Grouping(Box::new(d.clone())),
            )
        })
        .reduce(|acc, term| SqlExpr::binary(SqlBinaryOperator::Add, acc, term))
        .unwrap_or_else(|| SqlExpr::Literal(Literal::Integer(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::sql_ast::SqlRenderer;

    #[test]
    fn prefixes_not_powerset() {
        let dims = vec![
            SqlExpr::column("a"),
            SqlExpr::column("b"),
            SqlExpr::column("c"),
        ];
        let sets = prefix_grouping_sets(&dims);
        assert_eq!(sets.len(), 4);
        assert!(sets[0].is_empty());
        assert_eq!(sets[1], vec![SqlExpr::column("a")]);
        assert_eq!(sets[3], dims);
    }

    #[test]
    fn level_sums_grouping_flags() {
        let renderer = SqlRenderer::new(&PostgresDialect);
        let dims = vec![SqlExpr::column("a"), SqlExpr::column("b")];
        assert_eq!(
            renderer.render_expr(&level_expr(&dims)),
            "((1 - GROUPING(\"a\")) + (1 - GROUPING(\"b\")))"
        );
        assert_eq!(renderer.render_expr(&level_expr(&[])), "0");
    }
}
