//! Natural join on declared key columns

use super::validate::check_unique;
use super::{ColumnSet, Operator};
use crate::error::{format_columns, CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    /// Inner join
    #[default]
    Inner,
    /// Left outer join
    Left,
    /// Right outer join
    Right,
    /// Full outer join
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "INNER"),
            JoinType::Left => write!(f, "LEFT"),
            JoinType::Right => write!(f, "RIGHT"),
            JoinType::Full => write!(f, "FULL"),
        }
    }
}

impl std::str::FromStr for JoinType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INNER" => Ok(JoinType::Inner),
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            "FULL" | "OUTER" | "FULL OUTER" => Ok(JoinType::Full),
            _ => Err(CoreError::InvalidRepresentation {
                message: format!("unknown join type '{s}'"),
            }),
        }
    }
}

/// Join of two pipelines on identically named key columns.
///
/// Output columns are the left columns followed by right columns the left
/// side does not have. Columns on both sides are coalesced left-over-right.
#[derive(Debug, Clone)]
pub struct NaturalJoinNode {
    left: Box<Operator>,
    right: Box<Operator>,
    by: Vec<String>,
    jointype: JoinType,
    column_names: Vec<String>,
}

impl NaturalJoinNode {
    pub(crate) fn new(
        left: Operator,
        right: Operator,
        by: Vec<String>,
        jointype: JoinType,
    ) -> CoreResult<Self> {
        if by.is_empty() {
            return Err(CoreError::EmptyColumnList {
                context: "natural_join by".to_string(),
            });
        }
        check_unique("natural_join by", &by)?;
        for (side, op) in [("left", &left), ("right", &right)] {
            let missing: Vec<&String> = by.iter().filter(|c| !op.has_column(c)).collect();
            if !missing.is_empty() {
                return Err(CoreError::JoinKeyMissing {
                    side: side.to_string(),
                    columns: format_columns(missing),
                });
            }
        }
        let mut column_names = left.column_names().to_vec();
        for c in right.column_names() {
            if !left.has_column(c) {
                column_names.push(c.clone());
            }
        }
        Ok(Self {
            left: Box::new(left),
            right: Box::new(right),
            by,
            jointype,
            column_names,
        })
    }

    pub fn left(&self) -> &Operator {
        &self.left
    }

    pub fn right(&self) -> &Operator {
        &self.right
    }

    /// Join keys
    pub fn by(&self) -> &[String] {
        &self.by
    }

    pub fn jointype(&self) -> JoinType {
        self.jointype
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub(crate) fn columns_used(&self, using: &ColumnSet) -> Vec<ColumnSet> {
        [&self.left, &self.right]
            .into_iter()
            .map(|side| {
                using
                    .iter()
                    .chain(&self.by)
                    .filter(|c| side.has_column(c))
                    .cloned()
                    .collect()
            })
            .collect()
    }
}
