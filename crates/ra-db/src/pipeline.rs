//! Run operator pipelines on a database: load bound tables, compile, query

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use ra_core::{Operator, Table};
use ra_sql::{to_sql, SqlDialect};
use std::collections::HashMap;

/// Create one database table per table the pipeline reads, named the way the
/// compiler renders it, from tables bound by identity key.
pub async fn load_tables(
    db: &dyn Database,
    ops: &Operator,
    dialect: &dyn SqlDialect,
    bindings: &HashMap<String, Table>,
) -> DbResult<()> {
    for (key, desc) in ops.tables()? {
        let bound = bindings
            .get(&key)
            .ok_or_else(|| DbError::MissingBinding(key.clone()))?;
        let table = bound.select(desc.column_names())?;
        if let Some(schema) = desc.qualifiers().get("schema") {
            db.create_schema_if_not_exists(&dialect.quote_identifier(schema)?)
                .await?;
        }
        let name = dialect.quote_table_name(desc)?;
        log::debug!("loading '{}' as {} on {}", key, name, db.db_type());
        db.create_table_from(&name, &table, true).await?;
    }
    Ok(())
}

/// Compile `ops` for `dialect` and run it on `db`
pub async fn query_pipeline(
    db: &dyn Database,
    ops: &Operator,
    dialect: &dyn SqlDialect,
) -> DbResult<Table> {
    let sql = to_sql(ops, dialect)?;
    db.query_table(&sql).await
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
