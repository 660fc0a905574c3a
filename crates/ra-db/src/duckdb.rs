//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::types::Value as DuckValue;
use duckdb::{params_from_iter, Connection};
use ra_core::{Column, Table, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        log::debug!("duckdb execute: {}", sql);
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run a query synchronously, collecting every row
    fn query_table_sync(&self, sql: &str) -> DbResult<Table> {
        log::debug!("duckdb query: {}", sql);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        // column metadata is only available once the statement has run
        let names = rows
            .as_ref()
            .map(|s| s.column_names())
            .unwrap_or_default();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::new(),
            })
            .collect();
        while let Some(row) = rows.next()? {
            for (i, column) in columns.iter_mut().enumerate() {
                let raw: DuckValue = row.get(i)?;
                column.values.push(from_duck_value(&column.name, raw)?);
            }
        }
        log::trace!(
            "duckdb query returned {} columns",
            columns.len()
        );
        Ok(Table::new(columns)?)
    }

    /// Create and fill a table synchronously
    fn create_table_from_sync(&self, name: &str, table: &Table, replace: bool) -> DbResult<()> {
        let definitions = table
            .columns()
            .iter()
            .map(|c| Ok(format!("{} {}", quote_ident(&c.name), sql_type(c)?)))
            .collect::<DbResult<Vec<String>>>()?;
        let create = if replace {
            format!("CREATE OR REPLACE TABLE {} ({})", name, definitions.join(", "))
        } else {
            format!("CREATE TABLE {} ({})", name, definitions.join(", "))
        };
        self.execute_sync(&create)?;
        if table.num_rows() == 0 {
            return Ok(());
        }

        let placeholders = vec!["?"; table.num_columns()].join(", ");
        let insert = format!("INSERT INTO {} VALUES ({})", name, placeholders);
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&insert)?;
        for row in table.rows() {
            stmt.execute(params_from_iter(row.iter().map(to_duck_value)))?;
        }
        log::debug!("loaded {} rows into {}", table.num_rows(), name);
        Ok(())
    }

    /// `BASE TABLE` or `VIEW` for an existing relation; `name` may be `schema.table`
    fn relation_kind_sync(&self, name: &str) -> DbResult<Option<String>> {
        let conn = self.lock()?;

        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let mut stmt = conn.prepare(
            "SELECT table_type FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
        )?;
        let mut rows = stmt.query([schema, table])?;
        let kind: Option<String> = match rows.next()? {
            Some(row) => Some(row.get(0)?),
            None => None,
        };
        Ok(kind)
    }

    /// Drop whichever kind of relation `name` is
    fn drop_if_exists_sync(&self, name: &str) -> DbResult<()> {
        let sql = match self.relation_kind_sync(name)?.as_deref() {
            None => return Ok(()),
            Some("VIEW") => format!("DROP VIEW IF EXISTS {}", name),
            Some(_) => format!("DROP TABLE IF EXISTS {}", name),
        };
        self.execute_sync(&sql)?;
        Ok(())
    }
}

/// Double-quote an identifier, doubling embedded quotes
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// DuckDB column type able to hold every value of `column`
fn sql_type(column: &Column) -> DbResult<&'static str> {
    let mut found: Option<&'static str> = None;
    for v in &column.values {
        let t = match v {
            Value::Null => continue,
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "BIGINT",
            Value::Float(_) => "DOUBLE",
            Value::Str(_) => "VARCHAR",
        };
        found = match (found, t) {
            (None, t) => Some(t),
            (Some(a), b) if a == b => Some(a),
            (Some("BIGINT"), "DOUBLE") | (Some("DOUBLE"), "BIGINT") => Some("DOUBLE"),
            (Some(a), b) => {
                return Err(DbError::UnsupportedValue {
                    column: column.name.clone(),
                    type_name: format!("mixed {} and {}", a, b),
                })
            }
        };
    }
    Ok(found.unwrap_or("INTEGER"))
}

fn to_duck_value(v: &Value) -> DuckValue {
    match v {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Int(i) => DuckValue::BigInt(*i),
        Value::Float(f) => DuckValue::Double(*f),
        Value::Str(s) => DuckValue::Text(s.clone()),
    }
}

fn from_duck_value(column: &str, v: DuckValue) -> DbResult<Value> {
    let value = match v {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::Int(i.into()),
        DuckValue::SmallInt(i) => Value::Int(i.into()),
        DuckValue::Int(i) => Value::Int(i.into()),
        DuckValue::BigInt(i) => Value::Int(i),
        DuckValue::UTinyInt(i) => Value::Int(i.into()),
        DuckValue::USmallInt(i) => Value::Int(i.into()),
        DuckValue::UInt(i) => Value::Int(i.into()),
        // SUM over BIGINT yields HUGEINT
        DuckValue::HugeInt(i) => i64::try_from(i).map_or(Value::Float(i as f64), Value::Int),
        DuckValue::UBigInt(i) => i64::try_from(i).map_or(Value::Float(i as f64), Value::Int),
        DuckValue::Float(f) => Value::Float(f.into()),
        DuckValue::Double(f) => Value::Float(f),
        DuckValue::Decimal(d) => decimal_value(column, d.scale().into(), d.to_string())?,
        DuckValue::Text(s) | DuckValue::Enum(s) => Value::Str(s),
        other => {
            return Err(DbError::UnsupportedValue {
                column: column.to_string(),
                type_name: format!("{:?}", other),
            })
        }
    };
    Ok(value)
}

/// DECIMAL results: whole numbers stay integers when they fit
fn decimal_value(column: &str, scale: u32, text: String) -> DbResult<Value> {
    if scale == 0 {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Int(i));
        }
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| DbError::UnsupportedValue {
            column: column.to_string(),
            type_name: format!("DECIMAL {}", text),
        })
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_table(&self, sql: &str) -> DbResult<Table> {
        self.query_table_sync(sql)
    }

    async fn create_table_from(&self, name: &str, table: &Table, replace: bool) -> DbResult<()> {
        self.create_table_from_sync(name, table, replace)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        Ok(self.relation_kind_sync(name)?.is_some())
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        let sql = format!("CREATE SCHEMA IF NOT EXISTS {}", schema);
        self.execute_sync(&sql)?;
        Ok(())
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        self.drop_if_exists_sync(name)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
