//! Bound parameter values.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(NaiveDate),
}

/// SQL type a placeholder is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    Integer,
    Number,
    Date,
}

impl SqlParam {
    pub fn param_type(&self) -> ParamType {
        match self {
            SqlParam::Text(_) => ParamType::Text,
            SqlParam::Integer(_) => ParamType::Integer,
            SqlParam::Number(_) => ParamType::Number,
            SqlParam::Date(_) => ParamType::Date,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SqlParam::Text(s) => serde_json::Value::String(s.clone()),
            SqlParam::Integer(i) => serde_json::Value::from(*i),
            SqlParam::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlParam::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    #[cfg(feature = "postgres")]
    pub(crate) fn as_pg(&self) -> &(dyn tokio_postgres::types::ToSql + Sync) {
        match self {
            SqlParam::Text(s) => s,
            SqlParam::Integer(i) => i,
            SqlParam::Number(n) => n,
            SqlParam::Date(d) => d,
        }
    }
}

impl Serialize for SqlParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_json() {
        let params = vec![
            SqlParam::Text("ACME".into()),
            SqlParam::Integer(3),
            SqlParam::Number(10.5),
            SqlParam::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()),
        ];
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!(["ACME", 3, 10.5, "2025-01-31"]));
    }
}
