//! Table reference: the leaf of every pipeline

use super::validate::{check_column_list, into_names};
use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Description of a stored table: name, qualifiers and column list.
///
/// Two descriptions are the same table when their identity keys agree; the
/// key combines the sorted qualifiers with the table name.
#[derive(Debug, Clone)]
pub struct TableDescription {
    table_name: String,
    qualifiers: BTreeMap<String, String>,
    column_names: Vec<String>,
    key: String,
}

impl TableDescription {
    /// Describe an unqualified table
    pub fn new<I, S>(table_name: impl Into<String>, column_names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_qualifiers(table_name, column_names, BTreeMap::new())
    }

    /// Describe a table with qualifiers such as `schema`
    pub fn with_qualifiers<I, S>(
        table_name: impl Into<String>,
        column_names: I,
        qualifiers: BTreeMap<String, String>,
    ) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(CoreError::InvalidTable {
                message: "table name is empty".to_string(),
            });
        }
        let column_names = into_names(column_names);
        check_column_list(&format!("table '{table_name}'"), &column_names)?;
        let key = table_key(&table_name, &qualifiers);
        Ok(Self {
            table_name,
            qualifiers,
            column_names,
            key,
        })
    }

    /// Bare table name
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Qualifiers, sorted by key
    pub fn qualifiers(&self) -> &BTreeMap<String, String> {
        &self.qualifiers
    }

    /// Declared columns in order
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Identity key: `{(k1, v1)(k2, v2)}.name`, or `name` without qualifiers
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn table_key(table_name: &str, qualifiers: &BTreeMap<String, String>) -> String {
    if qualifiers.is_empty() {
        return table_name.to_string();
    }
    let pairs: String = qualifiers
        .iter()
        .map(|(k, v)| format!("({k}, {v})"))
        .collect();
    format!("{{{pairs}}}.{table_name}")
}

impl PartialEq for TableDescription {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TableDescription {}

impl Hash for TableDescription {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for TableDescription {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TableDescription {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
