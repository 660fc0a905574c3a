//! Column renaming

use super::validate::{check_known, check_unique};
use super::{ColumnSet, Operator};
use crate::error::{CoreError, CoreResult};

/// Rename columns; the mapping is new name to old name
#[derive(Debug, Clone)]
pub struct RenameColumnsNode {
    source: Box<Operator>,
    column_remapping: Vec<(String, String)>,
    column_names: Vec<String>,
}

impl RenameColumnsNode {
    pub(crate) fn new(
        source: Operator,
        column_remapping: Vec<(String, String)>,
    ) -> CoreResult<Self> {
        if column_remapping.is_empty() {
            return Err(CoreError::NoOperations {
                context: "rename_columns".to_string(),
            });
        }
        check_unique("rename_columns", column_remapping.iter().map(|(new, _)| new))?;
        check_unique("rename_columns", column_remapping.iter().map(|(_, old)| old))?;
        check_known(
            "rename_columns",
            column_remapping.iter().map(|(_, old)| old),
            &source,
        )?;
        for (new, _) in &column_remapping {
            let kept = source.has_column(new)
                && !column_remapping.iter().any(|(_, old)| old == new);
            if kept {
                return Err(CoreError::RenameCollision { column: new.clone() });
            }
        }

        let column_names = source
            .column_names()
            .iter()
            .map(|c| {
                column_remapping
                    .iter()
                    .find(|(_, old)| old == c)
                    .map_or_else(|| c.clone(), |(new, _)| new.clone())
            })
            .collect();
        Ok(Self {
            source: Box::new(source),
            column_remapping,
            column_names,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    /// `(new, old)` pairs in declaration order
    pub fn column_remapping(&self) -> &[(String, String)] {
        &self.column_remapping
    }

    /// Source name of an output column
    pub fn old_name<'a>(&'a self, column: &'a str) -> &'a str {
        self.column_remapping
            .iter()
            .find(|(new, _)| new == column)
            .map_or(column, |(_, old)| old.as_str())
    }

    /// Whether the output column comes from a renamed source column
    pub fn is_renamed(&self, column: &str) -> bool {
        self.column_remapping
            .iter()
            .any(|(new, old)| new == column && new != old)
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub(crate) fn columns_used(&self, using: &ColumnSet) -> ColumnSet {
        using.iter().map(|c| self.old_name(c).to_string()).collect()
    }
}
