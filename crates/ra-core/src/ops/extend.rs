//! Extend: add or overwrite columns, optionally over a window

use super::validate::{check_known, check_unique, into_names};
use super::{ColumnSet, Operator};
use crate::error::{format_columns, CoreError, CoreResult};
use crate::expr::Expression;

/// Partition, ordering and descending columns for a windowed extend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    pub partition_by: Vec<String>,
    pub order_by: Vec<String>,
    /// Subset of `order_by` sorted descending
    pub reverse: Vec<String>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_by = into_names(columns);
        self
    }

    pub fn order_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order_by = into_names(columns);
        self
    }

    pub fn reverse<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reverse = into_names(columns);
        self
    }

    /// No partitioning and no ordering
    pub fn is_empty(&self) -> bool {
        self.partition_by.is_empty() && self.order_by.is_empty()
    }

    /// Check list shapes and that every column exists in `source`
    pub(crate) fn validate(&self, source: &Operator) -> CoreResult<()> {
        check_unique("partition_by", &self.partition_by)?;
        check_unique("order_by", &self.order_by)?;
        check_unique("reverse", &self.reverse)?;
        check_known("partition_by", &self.partition_by, source)?;
        check_known("order_by", &self.order_by, source)?;
        let stray: Vec<&String> = self
            .reverse
            .iter()
            .filter(|c| !self.order_by.contains(c))
            .collect();
        if !stray.is_empty() {
            return Err(CoreError::ReverseNotInOrderBy {
                columns: format_columns(stray),
            });
        }
        Ok(())
    }
}

/// Extend node
#[derive(Debug, Clone)]
pub struct ExtendNode {
    source: Box<Operator>,
    ops: Vec<(String, Expression)>,
    window: Window,
    column_names: Vec<String>,
}

impl ExtendNode {
    pub(crate) fn new(
        source: Operator,
        ops: Vec<(String, Expression)>,
        window: Window,
    ) -> CoreResult<Self> {
        if ops.is_empty() {
            return Err(CoreError::NoOperations {
                context: "extend".to_string(),
            });
        }
        check_unique("extend", ops.iter().map(|(k, _)| k))?;
        window.validate(&source)?;
        for (k, _) in &ops {
            if window.partition_by.contains(k) || window.order_by.contains(k) {
                return Err(CoreError::AssignsWindowColumn { column: k.clone() });
            }
        }
        let mut referenced = ColumnSet::new();
        for (_, e) in &ops {
            e.collect_column_names(&mut referenced);
        }
        check_known("extend", &referenced, &source)?;

        let mut column_names = source.column_names().to_vec();
        for (k, _) in &ops {
            if !column_names.contains(k) {
                column_names.push(k.clone());
            }
        }
        Ok(Self {
            source: Box::new(source),
            ops,
            window,
            column_names,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    /// Assignments in declaration order
    pub fn ops(&self) -> &[(String, Expression)] {
        &self.ops
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn partition_by(&self) -> &[String] {
        &self.window.partition_by
    }

    pub fn order_by(&self) -> &[String] {
        &self.window.order_by
    }

    pub fn reverse(&self) -> &[String] {
        &self.window.reverse
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Assignments whose output is in `using`
    pub fn retained_ops<'a>(
        &'a self,
        using: &'a ColumnSet,
    ) -> impl Iterator<Item = &'a (String, Expression)> + 'a {
        self.ops.iter().filter(move |(k, _)| using.contains(k))
    }

    pub(crate) fn columns_used(&self, using: &ColumnSet) -> ColumnSet {
        let retained: Vec<&(String, Expression)> = self.retained_ops(using).collect();
        if retained.is_empty() {
            return using.clone();
        }
        let mut sub: ColumnSet = using
            .iter()
            .chain(&self.window.partition_by)
            .chain(&self.window.order_by)
            .filter(|c| self.source.has_column(c))
            .filter(|c| !retained.iter().any(|(k, _)| k == *c))
            .cloned()
            .collect();
        for (_, e) in retained {
            e.collect_column_names(&mut sub);
        }
        sub
    }
}
