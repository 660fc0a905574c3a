//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use ra_core::Table;

/// Database abstraction trait for running compiled pipelines
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and collect its full result
    async fn query_table(&self, sql: &str) -> DbResult<Table>;

    /// Create a table named `name` (SQL text, quoted by the caller) holding `table`
    async fn create_table_from(&self, name: &str, table: &Table, replace: bool) -> DbResult<()>;

    /// Read a whole relation back
    async fn read_table(&self, name: &str) -> DbResult<Table> {
        self.query_table(&format!("SELECT * FROM {}", name)).await
    }

    /// Check if a table or view exists; `name` may be `schema.table`
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
