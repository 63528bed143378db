use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::params::SqlParam;

#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Map<String, Value>>,
}

/// Runs one parameterized statement and returns its rows as column → value maps.
///
/// Implementations report every database failure as an `Err`; they do not retry.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult>;
}
