//! Operator-node IR
//!
//! A pipeline is a tree of [`Operator`] values rooted at the last operation
//! applied. Every node checks its invariants when it is built and computes its
//! output column list once. Builders consume the receiver and wrap it:
//!
//! ```
//! use ra_core::{col, Operator, TableDescription, Window};
//!
//! let d = TableDescription::new("d", ["subjectID", "category", "score"]).unwrap();
//! let ops = Operator::from(d)
//!     .extend_window(
//!         [("total", col("score").sum())],
//!         Window::new().partition_by(["subjectID"]),
//!     )
//!     .unwrap()
//!     .extend([("p", col("score") / col("total"))])
//!     .unwrap();
//! assert_eq!(ops.column_names(), ["subjectID", "category", "score", "total", "p"]);
//! ```

mod extend;
mod join;
mod order;
mod project;
mod rename;
mod select;
mod table;
mod validate;

pub use extend::{ExtendNode, Window};
pub use join::{JoinType, NaturalJoinNode};
pub use order::{OrderRowsNode, RowOrder};
pub use project::ProjectNode;
pub use rename::RenameColumnsNode;
pub use select::{DropColumnsNode, SelectColumnsNode, SelectRowsNode};
pub use table::TableDescription;

use crate::error::{CoreError, CoreResult};
use crate::expr::{parse_expression, ExprContext, Expression};
use std::collections::{BTreeMap, BTreeSet};
use validate::{check_known, into_names};

/// Unordered set of column names
pub type ColumnSet = BTreeSet<String>;

/// One step of a relational pipeline
#[derive(Debug, Clone)]
pub enum Operator {
    Table(TableDescription),
    Extend(ExtendNode),
    SelectRows(SelectRowsNode),
    SelectColumns(SelectColumnsNode),
    DropColumns(DropColumnsNode),
    Project(ProjectNode),
    OrderRows(OrderRowsNode),
    RenameColumns(RenameColumnsNode),
    NaturalJoin(NaturalJoinNode),
}

impl From<TableDescription> for Operator {
    fn from(td: TableDescription) -> Self {
        Operator::Table(td)
    }
}

impl Operator {
    /// Node kind name, as used in the interchange form
    pub fn kind(&self) -> &'static str {
        match self {
            Operator::Table(_) => "TableDescription",
            Operator::Extend(_) => "Extend",
            Operator::SelectRows(_) => "SelectRows",
            Operator::SelectColumns(_) => "SelectColumns",
            Operator::DropColumns(_) => "DropColumns",
            Operator::Project(_) => "Project",
            Operator::OrderRows(_) => "OrderRows",
            Operator::RenameColumns(_) => "RenameColumns",
            Operator::NaturalJoin(_) => "NaturalJoin",
        }
    }

    /// Output columns in order
    pub fn column_names(&self) -> &[String] {
        match self {
            Operator::Table(n) => n.column_names(),
            Operator::Extend(n) => n.column_names(),
            Operator::SelectRows(n) => n.column_names(),
            Operator::SelectColumns(n) => n.column_names(),
            Operator::DropColumns(n) => n.column_names(),
            Operator::Project(n) => n.column_names(),
            Operator::OrderRows(n) => n.column_names(),
            Operator::RenameColumns(n) => n.column_names(),
            Operator::NaturalJoin(n) => n.column_names(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|c| c == name)
    }

    /// Output columns as a set
    pub fn column_set(&self) -> ColumnSet {
        self.column_names().iter().cloned().collect()
    }

    /// Direct sources; two for a join, none for a table
    pub fn sources(&self) -> Vec<&Operator> {
        match self {
            Operator::Table(_) => Vec::new(),
            Operator::Extend(n) => vec![n.source()],
            Operator::SelectRows(n) => vec![n.source()],
            Operator::SelectColumns(n) => vec![n.source()],
            Operator::DropColumns(n) => vec![n.source()],
            Operator::Project(n) => vec![n.source()],
            Operator::OrderRows(n) => vec![n.source()],
            Operator::RenameColumns(n) => vec![n.source()],
            Operator::NaturalJoin(n) => vec![n.left(), n.right()],
        }
    }

    /// `using` checked against the output columns; `None` means all of them
    pub fn resolve_using(&self, using: Option<&ColumnSet>) -> CoreResult<ColumnSet> {
        match using {
            None => Ok(self.column_set()),
            Some(u) => {
                check_known(self.kind(), u, self)?;
                Ok(u.clone())
            }
        }
    }

    /// Minimal columns each source must supply so this node can produce
    /// `using` (all columns when `None`). One set per entry of [`sources`].
    ///
    /// [`sources`]: Operator::sources
    pub fn columns_used_from_sources(
        &self,
        using: Option<&ColumnSet>,
    ) -> CoreResult<Vec<ColumnSet>> {
        let using = self.resolve_using(using)?;
        let used = match self {
            Operator::Table(_) => Vec::new(),
            Operator::Extend(n) => vec![n.columns_used(&using)],
            Operator::SelectRows(n) => vec![n.columns_used(&using)],
            Operator::SelectColumns(_) | Operator::DropColumns(_) => vec![using],
            Operator::Project(n) => vec![n.columns_used(&using)],
            Operator::OrderRows(n) => vec![n.columns_used(&using)],
            Operator::RenameColumns(n) => vec![n.columns_used(&using)],
            Operator::NaturalJoin(n) => n.columns_used(&using),
        };
        Ok(used)
    }

    /// Parse expression text against this node's output columns
    pub fn parse(&self, source: &str, ctx: &ExprContext) -> CoreResult<Expression> {
        parse_expression(source, self.column_names(), ctx)
    }

    /// Every table referenced by the pipeline, keyed by identity key.
    ///
    /// The same key with different column lists is an error.
    pub fn tables(&self) -> CoreResult<BTreeMap<String, &TableDescription>> {
        let mut found: BTreeMap<String, &TableDescription> = BTreeMap::new();
        let mut stack = vec![self];
        while let Some(op) = stack.pop() {
            if let Operator::Table(td) = op {
                match found.get(td.key()) {
                    Some(seen) if seen.column_names() != td.column_names() => {
                        return Err(CoreError::ConflictingTable {
                            key: td.key().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        found.insert(td.key().to_string(), td);
                    }
                }
            }
            stack.extend(op.sources());
        }
        Ok(found)
    }

    /// Add or overwrite columns; aggregate assignments see the whole table
    pub fn extend<I, K>(self, ops: I) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
    {
        self.extend_window(ops, Window::default())
    }

    /// Add or overwrite columns; aggregate and `row_number()` assignments are
    /// computed over `window`
    pub fn extend_window<I, K>(self, ops: I, window: Window) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
    {
        let ops = ops.into_iter().map(|(k, e)| (k.into(), e)).collect();
        Ok(Operator::Extend(ExtendNode::new(self, ops, window)?))
    }

    /// Keep rows where `expr` is true
    pub fn select_rows(self, expr: Expression) -> CoreResult<Operator> {
        Ok(Operator::SelectRows(SelectRowsNode::new(self, expr)?))
    }

    pub fn select_columns<I, S>(self, columns: I) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Operator::SelectColumns(SelectColumnsNode::new(
            self,
            into_names(columns),
        )?))
    }

    pub fn drop_columns<I, S>(self, columns: I) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Operator::DropColumns(DropColumnsNode::new(
            self,
            into_names(columns),
        )?))
    }

    /// Aggregate the whole input to a single row
    pub fn project<I, K>(self, ops: I) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
    {
        self.project_grouped(ops, Vec::<String>::new())
    }

    /// Aggregate per distinct combination of `group_by` values
    pub fn project_grouped<I, K, G, S>(self, ops: I, group_by: G) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ops = ops.into_iter().map(|(k, e)| (k.into(), e)).collect();
        Ok(Operator::Project(ProjectNode::new(
            self,
            ops,
            into_names(group_by),
        )?))
    }

    pub fn order_rows(self, order: RowOrder) -> CoreResult<Operator> {
        Ok(Operator::OrderRows(OrderRowsNode::new(self, order)?))
    }

    /// Rename columns; each pair is `(new, old)`
    pub fn rename_columns<I, N, O>(self, mapping: I) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = (N, O)>,
        N: Into<String>,
        O: Into<String>,
    {
        let mapping = mapping
            .into_iter()
            .map(|(new, old)| (new.into(), old.into()))
            .collect();
        Ok(Operator::RenameColumns(RenameColumnsNode::new(self, mapping)?))
    }

    /// Join `self` (left) with `right` on the `by` columns
    pub fn natural_join<I, S>(
        self,
        right: Operator,
        by: I,
        jointype: JoinType,
    ) -> CoreResult<Operator>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Operator::NaturalJoin(NaturalJoinNode::new(
            self,
            right,
            into_names(by),
            jointype,
        )?))
    }
}

#[cfg(test)]
#[path = "ops_test.rs"]
mod tests;
