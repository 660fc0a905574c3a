//! Row filtering and column selection / deletion

use super::validate::{check_column_list, check_known, check_unique};
use super::{ColumnSet, Operator};
use crate::error::{CoreError, CoreResult};
use crate::expr::Expression;

/// Keep rows where a boolean expression is true
#[derive(Debug, Clone)]
pub struct SelectRowsNode {
    source: Box<Operator>,
    expr: Expression,
}

impl SelectRowsNode {
    pub(crate) fn new(source: Operator, expr: Expression) -> CoreResult<Self> {
        check_known("select_rows", &expr.column_names(), &source)?;
        Ok(Self {
            source: Box::new(source),
            expr,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    /// Filter condition
    pub fn expr(&self) -> &Expression {
        &self.expr
    }

    pub fn column_names(&self) -> &[String] {
        self.source.column_names()
    }

    pub(crate) fn columns_used(&self, using: &ColumnSet) -> ColumnSet {
        let mut sub = using.clone();
        self.expr.collect_column_names(&mut sub);
        sub
    }
}

/// Keep only the listed columns, in the listed order
#[derive(Debug, Clone)]
pub struct SelectColumnsNode {
    source: Box<Operator>,
    columns: Vec<String>,
}

impl SelectColumnsNode {
    pub(crate) fn new(source: Operator, columns: Vec<String>) -> CoreResult<Self> {
        check_column_list("select_columns", &columns)?;
        check_known("select_columns", &columns, &source)?;
        Ok(Self {
            source: Box::new(source),
            columns,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }
}

/// Remove the listed columns
#[derive(Debug, Clone)]
pub struct DropColumnsNode {
    source: Box<Operator>,
    column_deletions: Vec<String>,
    column_names: Vec<String>,
}

impl DropColumnsNode {
    pub(crate) fn new(source: Operator, column_deletions: Vec<String>) -> CoreResult<Self> {
        if column_deletions.is_empty() {
            return Err(CoreError::EmptyColumnList {
                context: "drop_columns".to_string(),
            });
        }
        check_unique("drop_columns", &column_deletions)?;
        check_known("drop_columns", &column_deletions, &source)?;
        let column_names: Vec<String> = source
            .column_names()
            .iter()
            .filter(|c| !column_deletions.contains(c))
            .cloned()
            .collect();
        if column_names.is_empty() {
            return Err(CoreError::EmptyColumnList {
                context: "drop_columns would remove every column".to_string(),
            });
        }
        Ok(Self {
            source: Box::new(source),
            column_deletions,
            column_names,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    pub fn column_deletions(&self) -> &[String] {
        &self.column_deletions
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}
