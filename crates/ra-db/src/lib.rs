//! ra-db - Database layer for Relalg
//!
//! This crate provides the async `Database` trait, its DuckDB
//! implementation, and helpers that load bound tables and run compiled
//! pipelines.

pub mod duckdb;
pub mod error;
pub mod pipeline;
pub mod traits;

pub use self::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use pipeline::{load_tables, query_pipeline};
pub use traits::Database;
