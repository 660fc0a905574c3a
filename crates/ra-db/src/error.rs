//! Error types for ra-db

use ra_core::CoreError;
use ra_sql::SqlError;
use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Mutex poisoned (D004)
    #[error("[D004] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Value that has no table representation (D005)
    #[error("[D005] Column '{column}' holds an unsupported value: {type_name}")]
    UnsupportedValue { column: String, type_name: String },

    /// Binding missing for a table the pipeline reads (D006)
    #[error("[D006] No table bound for '{0}'")]
    MissingBinding(String),

    /// Error from the SQL layer (D007)
    #[error("[D007] {0}")]
    Sql(#[from] SqlError),

    /// Error from the IR layer (D008)
    #[error("[D008] {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error carries no structured catalog variants
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
