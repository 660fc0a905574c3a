//! Project: grouped aggregation

use super::validate::{check_known, check_unique};
use super::{ColumnSet, Operator};
use crate::error::{CoreError, CoreResult};
use crate::expr::Expression;

/// One row per group, holding group columns then aggregate results
#[derive(Debug, Clone)]
pub struct ProjectNode {
    source: Box<Operator>,
    ops: Vec<(String, Expression)>,
    group_by: Vec<String>,
    column_names: Vec<String>,
}

impl ProjectNode {
    pub(crate) fn new(
        source: Operator,
        ops: Vec<(String, Expression)>,
        group_by: Vec<String>,
    ) -> CoreResult<Self> {
        if ops.is_empty() && group_by.is_empty() {
            return Err(CoreError::NoOperations {
                context: "project".to_string(),
            });
        }
        check_unique("group_by", &group_by)?;
        check_known("group_by", &group_by, &source)?;
        let mut referenced = ColumnSet::new();
        for (_, e) in &ops {
            e.collect_column_names(&mut referenced);
        }
        check_known("project", &referenced, &source)?;

        let column_names: Vec<String> = group_by
            .iter()
            .chain(ops.iter().map(|(k, _)| k))
            .cloned()
            .collect();
        check_unique("project", &column_names)?;
        Ok(Self {
            source: Box::new(source),
            ops,
            group_by,
            column_names,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    /// Aggregates in declaration order
    pub fn ops(&self) -> &[(String, Expression)] {
        &self.ops
    }

    pub fn group_by(&self) -> &[String] {
        &self.group_by
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub(crate) fn columns_used(&self, using: &ColumnSet) -> ColumnSet {
        let mut sub: ColumnSet = self.group_by.iter().cloned().collect();
        for (_, e) in self.ops.iter().filter(|(k, _)| using.contains(k)) {
            e.collect_column_names(&mut sub);
        }
        sub
    }
}
