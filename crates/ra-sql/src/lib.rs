//! ra-sql - SQL layer for Relalg
//!
//! This crate renders operator-node pipelines as nested SQL queries, with
//! pluggable dialects, YAML dialect configuration, and sqlparser-based
//! checking of the generated text.

pub mod compiler;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;

pub use compiler::{to_sql, to_sql_using, SqlCompiler};
pub use config::DialectConfig;
pub use dialect::{
    dialect_by_name, DialectSettings, DuckDbDialect, Formatter, FormatterRegistry,
    GenericDialect, PostgreSqlDialect, SqlDialect, SqliteDialect,
};
pub use error::{SqlError, SqlResult};
pub use expr::SqlExpr;
