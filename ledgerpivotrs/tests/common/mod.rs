#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use ledger_pivot::error::{PivotError, Result};
use ledger_pivot::executor::{QueryExecutor, QueryResult};
use ledger_pivot::SqlParam;

/// Records every call and answers with fixed rows.
#[derive(Default)]
pub struct RecordingExecutor {
    pub calls: Mutex<Vec<(String, Vec<SqlParam>)>>,
    pub rows: Vec<Map<String, Value>>,
}

impl RecordingExecutor {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            rows: rows.into_iter().map(object).collect(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(QueryResult {
            columns: vec![],
            rows: self.rows.clone(),
        })
    }
}

/// Fails every query the way a database driver would.
pub struct FailingExecutor {
    pub message: String,
}

#[async_trait]
impl QueryExecutor for FailingExecutor {
    async fn execute(&self, _sql: &str, _params: &[SqlParam]) -> Result<QueryResult> {
        Err(PivotError::QueryExecution(self.message.clone()))
    }
}

/// One fact row: labels for each requested level plus the measured amount.
pub struct Fact {
    pub labels: Vec<Option<&'static str>>,
    pub amount: f64,
}

pub fn fact(labels: &[Option<&'static str>], amount: f64) -> Fact {
    Fact {
        labels: labels.to_vec(),
        amount,
    }
}

/// Answers with the rows prefix grouping sets produce over a fixed fact table.
///
/// The number of levels is read from the `GROUPING(` calls in the statement.
pub struct RollupExecutor {
    pub facts: Vec<Fact>,
}

#[async_trait]
impl QueryExecutor for RollupExecutor {
    async fn execute(&self, sql: &str, _params: &[SqlParam]) -> Result<QueryResult> {
        let level_count = sql.matches("GROUPING(").count();
        let mut rows = Vec::new();
        for level in 0..=level_count {
            let mut groups: BTreeMap<Vec<Option<&str>>, f64> = BTreeMap::new();
            for f in &self.facts {
                *groups.entry(f.labels[..level].to_vec()).or_default() += f.amount;
            }
            for (labels, total) in groups {
                let mut row = Map::new();
                row.insert("level".to_string(), Value::from(level as i64));
                for idx in 0..5 {
                    let label = labels.get(idx).copied().flatten();
                    row.insert(
                        format!("dim_{}", idx + 1),
                        label.map(Value::from).unwrap_or(Value::Null),
                    );
                }
                row.insert("value".to_string(), Value::from(total));
                rows.push(row);
            }
        }
        Ok(QueryResult {
            columns: vec![],
            rows,
        })
    }
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
