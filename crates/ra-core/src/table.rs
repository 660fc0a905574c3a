//! Columnar in-memory table: an ordered list of named, equal-length columns

use crate::error::{CoreError, CoreResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A named column of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Cell values, one per row
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from anything convertible to values
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered collection of equal-length columns with unique names
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree
    pub fn new(columns: Vec<Column>) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.name.as_str()) {
                return Err(CoreError::InvalidTable {
                    message: format!("duplicate column '{}'", c.name),
                });
            }
        }
        if let Some(first) = columns.first() {
            let n = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != n) {
                return Err(CoreError::InvalidTable {
                    message: format!(
                        "column '{}' has {} rows, expected {}",
                        bad.name,
                        bad.values.len(),
                        n
                    ),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from column names and row-major data
    pub fn from_rows<I, S>(names: I, rows: Vec<Vec<Value>>) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CoreError::InvalidTable {
                    message: format!(
                        "row {} has {} values, expected {}",
                        i,
                        row.len(),
                        columns.len()
                    ),
                });
            }
            for (col, v) in columns.iter_mut().zip(row) {
                col.values.push(v);
            }
        }
        Self::new(columns)
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Consume the table, returning its columns
    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Values of a column
    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.column(name).map(|c| c.values.as_slice())
    }

    /// Copy of one row
    pub fn row(&self, i: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.values[i].clone()).collect()
    }

    /// Iterate rows as owned vectors
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.num_rows()).map(move |i| self.row(i))
    }

    /// Project onto the named columns, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> CoreResult<Table> {
        let mut columns = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column(name.as_ref()) {
                Some(c) => columns.push(c.clone()),
                None => missing.push(name.as_ref().to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(CoreError::UnknownColumns {
                context: "table".to_string(),
                columns: crate::error::format_columns(&missing),
            });
        }
        Table::new(columns)
    }

    /// Gather rows by index (indices may repeat)
    pub fn take(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table { columns }
    }

    /// Replace the named column, or append it if absent
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> CoreResult<()> {
        if !self.columns.is_empty() && values.len() != self.num_rows() {
            return Err(CoreError::InvalidTable {
                message: format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    self.num_rows()
                ),
            });
        }
        match self.column_index(name) {
            Some(i) => self.columns[i].values = values,
            None => self.columns.push(Column {
                name: name.to_string(),
                values,
            }),
        }
        Ok(())
    }

    /// Remove a column, returning it
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let i = self.column_index(name)?;
        Some(self.columns.remove(i))
    }

    /// Rename a column in place; no-op when `old` is absent
    pub fn rename_column(&mut self, old: &str, new: &str) {
        if let Some(c) = self.columns.iter_mut().find(|c| c.name == old) {
            c.name = new.to_string();
        }
    }

    /// Row-set equivalence: same column names (any order) and the same multiset
    /// of rows, comparing numbers with `float_tol`.
    pub fn equivalent(&self, other: &Table, float_tol: f64) -> bool {
        if self.num_columns() != other.num_columns() || self.num_rows() != other.num_rows() {
            return false;
        }
        let names = self.column_names();
        let Ok(other) = other.select(&names) else {
            return false;
        };
        let mut left: Vec<Vec<Value>> = self.rows().collect();
        let mut right: Vec<Vec<Value>> = other.rows().collect();
        left.sort_by(|a, b| compare_rows(a, b));
        right.sort_by(|a, b| compare_rows(a, b));
        left.iter().zip(right.iter()).all(|(a, b)| {
            a.iter()
                .zip(b.iter())
                .all(|(x, y)| x.approx_eq(y, float_tol))
        })
    }
}

/// Lexicographic row order built on [`Value::sort_cmp`]
pub fn compare_rows(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.sort_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
