use thiserror::Error;

pub type Result<T> = std::result::Result<T, PivotError>;

#[derive(Debug, Error)]
pub enum PivotError {
    #[error("unknown dimension {0}")]
    UnknownDimension(String),
    #[error("unknown measure {0}")]
    UnknownMeasure(String),
    #[error("unknown filter field {0}")]
    UnknownFilterField(String),
    #[error("too many levels: {requested} requested, at most {max} allowed")]
    TooManyLevels { requested: usize, max: usize },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("query execution error: {0}")]
    QueryExecution(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PivotError {
    /// True for errors raised before any SQL reaches the database.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PivotError::UnknownDimension(_)
                | PivotError::UnknownMeasure(_)
                | PivotError::UnknownFilterField(_)
                | PivotError::TooManyLevels { .. }
                | PivotError::InvalidRequest(_)
        )
    }

    /// Stable machine-readable code carried in failure outcomes.
    pub fn code(&self) -> &'static str {
        match self {
            PivotError::UnknownDimension(_) => "unknown_dimension",
            PivotError::UnknownMeasure(_) => "unknown_measure",
            PivotError::UnknownFilterField(_) => "unknown_filter_field",
            PivotError::TooManyLevels { .. } => "too_many_levels",
            PivotError::InvalidRequest(_) => "invalid_request",
            PivotError::QueryExecution(_) => "query_execution",
            PivotError::Config(_) => "config",
            PivotError::Io(_) | PivotError::Yaml(_) | PivotError::Json(_) => "io",
            PivotError::Other(_) => "other",
        }
    }
}
