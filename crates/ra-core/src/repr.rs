//! Structured interchange form of a pipeline
//!
//! A pipeline is stored as a list of steps: the table description first, then
//! each operation in the order it was applied. Expressions are stored as text
//! (see [`Expression::to_source`](crate::Expression::to_source)) and read back
//! with the expression parser. The right side of a join is a nested step list.

use crate::error::{CoreError, CoreResult};
use crate::expr::{ExprContext, Expression};
use crate::ops::{JoinType, Operator, RowOrder, TableDescription, Window};
use crate::serde_helpers::ordered_pairs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op")]
pub enum OpRepr {
    TableDescription {
        table_name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        qualifiers: BTreeMap<String, String>,
        column_names: Vec<String>,
        /// Identity key; recomputed on load and checked when present
        #[serde(default, skip_serializing_if = "String::is_empty")]
        key: String,
    },
    Extend {
        #[serde(with = "ordered_pairs")]
        ops: Vec<(String, String)>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        partition_by: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        order_by: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        reverse: Vec<String>,
    },
    SelectRows {
        expr: String,
    },
    SelectColumns {
        columns: Vec<String>,
    },
    DropColumns {
        column_deletions: Vec<String>,
    },
    Project {
        #[serde(with = "ordered_pairs")]
        ops: Vec<(String, String)>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        group_by: Vec<String>,
    },
    OrderRows {
        order_columns: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        reverse: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    RenameColumns {
        /// New name to old name
        #[serde(with = "ordered_pairs")]
        column_remapping: Vec<(String, String)>,
    },
    NaturalJoin {
        by: Vec<String>,
        #[serde(default)]
        jointype: JoinType,
        /// Right-hand pipeline
        b: Vec<OpRepr>,
    },
}

fn sources_of(ops: &[(String, Expression)]) -> Vec<(String, String)> {
    ops.iter()
        .map(|(k, e)| (k.clone(), e.to_source()))
        .collect()
}

impl Operator {
    /// Steps of this pipeline, table first.
    pub fn to_repr(&self) -> Vec<OpRepr> {
        let mut steps = Vec::new();
        let mut current = self;
        loop {
            let (step, next) = match current {
                Operator::Table(td) => (
                    OpRepr::TableDescription {
                        table_name: td.table_name().to_string(),
                        qualifiers: td.qualifiers().clone(),
                        column_names: td.column_names().to_vec(),
                        key: td.key().to_string(),
                    },
                    None,
                ),
                Operator::Extend(n) => (
                    OpRepr::Extend {
                        ops: sources_of(n.ops()),
                        partition_by: n.partition_by().to_vec(),
                        order_by: n.order_by().to_vec(),
                        reverse: n.reverse().to_vec(),
                    },
                    Some(n.source()),
                ),
                Operator::SelectRows(n) => (
                    OpRepr::SelectRows {
                        expr: n.expr().to_source(),
                    },
                    Some(n.source()),
                ),
                Operator::SelectColumns(n) => (
                    OpRepr::SelectColumns {
                        columns: n.column_names().to_vec(),
                    },
                    Some(n.source()),
                ),
                Operator::DropColumns(n) => (
                    OpRepr::DropColumns {
                        column_deletions: n.column_deletions().to_vec(),
                    },
                    Some(n.source()),
                ),
                Operator::Project(n) => (
                    OpRepr::Project {
                        ops: sources_of(n.ops()),
                        group_by: n.group_by().to_vec(),
                    },
                    Some(n.source()),
                ),
                Operator::OrderRows(n) => (
                    OpRepr::OrderRows {
                        order_columns: n.order_by().to_vec(),
                        reverse: n.reverse().to_vec(),
                        limit: n.limit(),
                    },
                    Some(n.source()),
                ),
                Operator::RenameColumns(n) => (
                    OpRepr::RenameColumns {
                        column_remapping: n.column_remapping().to_vec(),
                    },
                    Some(n.source()),
                ),
                Operator::NaturalJoin(n) => (
                    OpRepr::NaturalJoin {
                        by: n.by().to_vec(),
                        jointype: n.jointype(),
                        b: n.right().to_repr(),
                    },
                    Some(n.left()),
                ),
            };
            steps.push(step);
            match next {
                Some(source) => current = source,
                None => break,
            }
        }
        steps.reverse();
        steps
    }

    /// Rebuild a pipeline from its steps.
    pub fn from_repr(steps: &[OpRepr]) -> CoreResult<Operator> {
        let ctx = ExprContext::new();
        let (first, rest) = steps.split_first().ok_or_else(|| invalid("empty pipeline"))?;
        let mut op = match first {
            OpRepr::TableDescription {
                table_name,
                qualifiers,
                column_names,
                key,
            } => {
                let td = TableDescription::with_qualifiers(
                    table_name.clone(),
                    column_names.iter().cloned(),
                    qualifiers.clone(),
                )?;
                if !key.is_empty() && key != td.key() {
                    return Err(invalid(format!(
                        "table key '{key}' does not match '{}'",
                        td.key()
                    )));
                }
                Operator::from(td)
            }
            other => {
                return Err(invalid(format!(
                    "pipeline must start with a TableDescription, found {}",
                    step_name(other)
                )))
            }
        };
        for step in rest {
            log::trace!("rebuilding {} step", step_name(step));
            op = apply_step(op, step, &ctx)?;
        }
        Ok(op)
    }
}

fn apply_step(op: Operator, step: &OpRepr, ctx: &ExprContext) -> CoreResult<Operator> {
    match step {
        OpRepr::TableDescription { .. } => Err(invalid(
            "TableDescription may only appear as the first step",
        )),
        OpRepr::Extend {
            ops,
            partition_by,
            order_by,
            reverse,
        } => {
            let parsed = parse_pairs(&op, ops, ctx)?;
            let window = Window::new()
                .partition_by(partition_by.iter().cloned())
                .order_by(order_by.iter().cloned())
                .reverse(reverse.iter().cloned());
            op.extend_window(parsed, window)
        }
        OpRepr::SelectRows { expr } => {
            let e = op.parse(expr, ctx)?;
            op.select_rows(e)
        }
        OpRepr::SelectColumns { columns } => op.select_columns(columns.iter().cloned()),
        OpRepr::DropColumns { column_deletions } => {
            op.drop_columns(column_deletions.iter().cloned())
        }
        OpRepr::Project { ops, group_by } => {
            let parsed = parse_pairs(&op, ops, ctx)?;
            op.project_grouped(parsed, group_by.iter().cloned())
        }
        OpRepr::OrderRows {
            order_columns,
            reverse,
            limit,
        } => {
            let mut order =
                RowOrder::by(order_columns.iter().cloned()).reverse(reverse.iter().cloned());
            order.limit = *limit;
            op.order_rows(order)
        }
        OpRepr::RenameColumns { column_remapping } => {
            op.rename_columns(column_remapping.iter().cloned())
        }
        OpRepr::NaturalJoin { by, jointype, b } => {
            let right = Operator::from_repr(b)?;
            op.natural_join(right, by.iter().cloned(), *jointype)
        }
    }
}

fn parse_pairs(
    op: &Operator,
    pairs: &[(String, String)],
    ctx: &ExprContext,
) -> CoreResult<Vec<(String, Expression)>> {
    pairs
        .iter()
        .map(|(k, text)| Ok((k.clone(), op.parse(text, ctx)?)))
        .collect()
}

fn step_name(step: &OpRepr) -> &'static str {
    match step {
        OpRepr::TableDescription { .. } => "TableDescription",
        OpRepr::Extend { .. } => "Extend",
        OpRepr::SelectRows { .. } => "SelectRows",
        OpRepr::SelectColumns { .. } => "SelectColumns",
        OpRepr::DropColumns { .. } => "DropColumns",
        OpRepr::Project { .. } => "Project",
        OpRepr::OrderRows { .. } => "OrderRows",
        OpRepr::RenameColumns { .. } => "RenameColumns",
        OpRepr::NaturalJoin { .. } => "NaturalJoin",
    }
}

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::InvalidRepresentation {
        message: message.into(),
    }
}

/// Render a pipeline as YAML
pub fn to_yaml(op: &Operator) -> CoreResult<String> {
    Ok(serde_yaml::to_string(&op.to_repr())?)
}

/// Read a pipeline from YAML
pub fn from_yaml(text: &str) -> CoreResult<Operator> {
    let steps: Vec<OpRepr> = serde_yaml::from_str(text)?;
    Operator::from_repr(&steps)
}

/// Render a pipeline as pretty-printed JSON
pub fn to_json(op: &Operator) -> CoreResult<String> {
    Ok(serde_json::to_string_pretty(&op.to_repr())?)
}

/// Read a pipeline from JSON
pub fn from_json(text: &str) -> CoreResult<Operator> {
    let steps: Vec<OpRepr> = serde_json::from_str(text)?;
    Operator::from_repr(&steps)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Write a pipeline to `path`: JSON for a `.json` extension, YAML otherwise
pub fn save(op: &Operator, path: &Path) -> CoreResult<()> {
    let text = if is_json(path) {
        to_json(op)?
    } else {
        to_yaml(op)?
    };
    std::fs::write(path, text).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

/// Read a pipeline written by [`save`]
pub fn load(path: &Path) -> CoreResult<Operator> {
    let text = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    if is_json(path) {
        from_json(&text)
    } else {
        from_yaml(&text)
    }
}

#[cfg(test)]
#[path = "repr_test.rs"]
mod tests;
