use serde::Serialize;

use crate::error::{PivotError, Result};
use crate::executor::QueryExecutor;
use crate::interpret::interpret_rows;
use crate::models::{
    BaseDataset, DateColumn, DimensionLevel, PivotRequest, PivotResultRow, RecordKind, TimeGrain,
};
use crate::params::SqlParam;
use crate::query_builder::{PivotQueryBuilder, PivotSql};

/// Echo of the resolved request, returned with successful pivots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotMeta {
    pub base_dataset: BaseDataset,
    pub record_kind: RecordKind,
    pub date_column: DateColumn,
    pub date_grain: Option<TimeGrain>,
    pub levels: Vec<DimensionLevel>,
    pub measure: String,
}

impl PivotMeta {
    fn from_request(request: &PivotRequest) -> Self {
        Self {
            base_dataset: request.base_dataset,
            record_kind: request.record_kind,
            date_column: request.effective_date_column(),
            date_grain: request.date_grain,
            levels: request.levels.clone(),
            measure: request.measure.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PivotResponse {
    pub rows: Vec<PivotResultRow>,
    pub sql: PivotSql,
    pub meta: PivotMeta,
}

/// Wire shape handed back to callers; never an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotOutcome {
    pub success: bool,
    pub message: String,
    pub rows: Vec<PivotResultRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_params: Option<Vec<SqlParam>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PivotMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl PivotOutcome {
    pub fn success(response: PivotResponse) -> Self {
        Self {
            success: true,
            message: format!("pivot produced {} rows", response.rows.len()),
            rows: response.rows,
            sql_text: Some(response.sql.sql),
            sql_params: Some(response.sql.params),
            meta: Some(response.meta),
            error_code: None,
        }
    }

    pub fn failure(error: &PivotError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            rows: Vec::new(),
            sql_text: None,
            sql_params: None,
            meta: None,
            error_code: Some(error.code()),
        }
    }
}

/// Build, execute and interpret one pivot, propagating errors.
///
/// Validation happens entirely before the executor is called.
pub async fn execute_pivot(
    builder: &PivotQueryBuilder<'_>,
    executor: &dyn QueryExecutor,
    request: &PivotRequest,
) -> Result<PivotResponse> {
    let sql = builder.build(request)?;
    let result = executor.execute(&sql.sql, &sql.params).await?;
    let rows = interpret_rows(&result.rows, sql.level_count)?;
    Ok(PivotResponse {
        rows,
        sql,
        meta: PivotMeta::from_request(request),
    })
}

/// Run a pivot and fold any failure into a `success: false` outcome.
pub async fn run_pivot(
    builder: &PivotQueryBuilder<'_>,
    executor: &dyn QueryExecutor,
    request: &PivotRequest,
) -> PivotOutcome {
    match execute_pivot(builder, executor, request).await {
        Ok(response) => {
            tracing::debug!(rows = response.rows.len(), "pivot completed");
            PivotOutcome::success(response)
        }
        Err(e) => {
            if e.is_validation() {
                tracing::warn!(error = %e, code = e.code(), "pivot rejected");
            } else {
                tracing::error!(error = %e, code = e.code(), "pivot failed");
            }
            PivotOutcome::failure(&e)
        }
    }
}
