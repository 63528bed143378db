use crate::params::SqlParam;
use crate::sql_ast::{SqlBinaryOperator, SqlExpr};

/// Accumulates WHERE predicates alongside the values they bind.
///
/// A placeholder's index is taken from the parameter vector at the moment the
/// value is pushed, so numbering always equals emission order.
#[derive(Debug, Default)]
pub(crate) struct ParamBinder {
    predicates: Vec<SqlExpr>,
    params: Vec<SqlParam>,
}

impl ParamBinder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, value: SqlParam) -> SqlExpr {
        let ty = value.param_type();
        self.params.push(value);
        SqlExpr::Param {
            index: self.params.len() - 1,
            ty,
        }
    }

    pub(crate) fn push(&mut self, predicate: SqlExpr) {
        self.predicates.push(predicate);
    }

    pub(crate) fn compare(&mut self, target: SqlExpr, op: SqlBinaryOperator, value: SqlParam) {
        let param = self.bind(value);
        self.push(SqlExpr::binary(op, target, param));
    }

    pub(crate) fn finish(self) -> (Vec<SqlExpr>, Vec<SqlParam>) {
        (self.predicates, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamType;

    #[test]
    fn indices_follow_emission_order() {
        let mut binder = ParamBinder::new();
        binder.compare(
            SqlExpr::column("b"),
            SqlBinaryOperator::Eq,
            SqlParam::Text("second".into()),
        );
        let first = binder.bind(SqlParam::Integer(1));
        let (predicates, params) = binder.finish();

        assert_eq!(predicates.len(), 1);
        assert_eq!(
            first,
            SqlExpr::Param {
                index: 1,
                ty: ParamType::Integer
            }
        );
        assert_eq!(
            params,
            vec![SqlParam::Text("second".into()), SqlParam::Integer(1)]
        );
    }
}
