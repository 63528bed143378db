pub mod backends;
pub mod catalog;
pub mod config;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod interpret;
pub mod models;
pub mod params;
pub mod query_builder;
pub mod runtime;
pub mod sql_ast;
pub mod telemetry;

pub use catalog::PivotCatalog;
pub use config::PivotConfig;
pub use error::PivotError;
pub use executor::{QueryExecutor, QueryResult};
pub use models::{DimensionLevel, DimensionSlot, PivotRequest, PivotResultRow};
pub use params::SqlParam;
pub use query_builder::{PivotQueryBuilder, PivotSql};
pub use runtime::{execute_pivot, run_pivot, PivotOutcome};

#[cfg(feature = "postgres")]
pub use backends::PostgresConnection;
