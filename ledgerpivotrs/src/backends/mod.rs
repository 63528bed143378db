//! Database backend implementations.
//!
//! Each backend is gated behind a feature flag and implements [`QueryExecutor`].
//!
//! [`QueryExecutor`]: crate::executor::QueryExecutor

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::PostgresConnection;
