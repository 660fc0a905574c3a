//! Operator-node IR to nested SQL
//!
//! Each node becomes one `SELECT` wrapping its source's query as an aliased
//! subquery. Only the requested columns are selected at each level, and the
//! requirement is pushed down to sources through
//! [`Operator::columns_used_from_sources`].

use ra_core::{ColumnSet, Expression, Operator};

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};
use crate::expr::SqlExpr;

/// Compile all columns of `op`
pub fn to_sql(op: &Operator, dialect: &dyn SqlDialect) -> SqlResult<String> {
    SqlCompiler::new(dialect).compile(op, None)
}

/// Compile `columns` of `op`; the outer select lists exactly those columns
pub fn to_sql_using(
    op: &Operator,
    dialect: &dyn SqlDialect,
    columns: &ColumnSet,
) -> SqlResult<String> {
    SqlCompiler::new(dialect).compile(op, Some(columns))
}

/// SQL compiler holding the dialect and the subquery alias counter.
///
/// Aliases stay unique across every query compiled by one compiler.
pub struct SqlCompiler<'d> {
    dialect: &'d dyn SqlDialect,
    temp_id: usize,
}

impl<'d> SqlCompiler<'d> {
    pub fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self {
            dialect,
            temp_id: 0,
        }
    }

    pub fn dialect(&self) -> &'d dyn SqlDialect {
        self.dialect
    }

    /// Parse generated SQL with the dialect's parser
    pub fn check(&self, sql: &str) -> SqlResult<()> {
        let statements = self.dialect.parse(sql)?;
        log::debug!(
            "{} statement(s) parsed with the {} dialect",
            statements.len(),
            self.dialect.name()
        );
        Ok(())
    }

    /// Compile `op`, selecting `using` (all columns when `None`)
    pub fn compile(&mut self, op: &Operator, using: Option<&ColumnSet>) -> SqlResult<String> {
        let using = self.resolve_using(op, using)?;
        let columns: Vec<&String> = op
            .column_names()
            .iter()
            .filter(|c| using.contains(*c))
            .collect();
        log::trace!("compiling {} for {} column(s)", op.kind(), columns.len());

        match op {
            Operator::Table(td) => {
                let items = self.quote_all(&columns)?;
                Ok(format!(
                    "SELECT {} FROM {}",
                    items.join(", "),
                    self.dialect.quote_table_name(td)?
                ))
            }
            Operator::Extend(n) => {
                let retained: Vec<&(String, Expression)> = n.retained_ops(&using).collect();
                if retained.is_empty() {
                    return self.compile(n.source(), Some(&using));
                }
                let (sub_sql, alias) = self.single_source(op, &using)?;
                let mut items = Vec::with_capacity(columns.len());
                for c in &columns {
                    match retained.iter().find(|(k, _)| k == *c) {
                        Some((_, e)) => {
                            let window = if e.is_window_call() {
                                self.window_term(
                                    n.partition_by(),
                                    n.order_by(),
                                    n.reverse(),
                                    e.is_aggregate(),
                                )?
                            } else {
                                String::new()
                            };
                            items.push(format!(
                                "{}{} AS {}",
                                e.to_sql(self.dialect, false)?,
                                window,
                                self.dialect.quote_identifier(c)?
                            ));
                        }
                        None => items.push(self.dialect.quote_identifier(c)?),
                    }
                }
                Ok(format!(
                    "SELECT {} FROM ( {} ) {}",
                    items.join(", "),
                    sub_sql,
                    alias
                ))
            }
            Operator::SelectRows(n) => {
                let (sub_sql, alias) = self.single_source(op, &using)?;
                let items = self.quote_all(&columns)?;
                Ok(format!(
                    "SELECT {} FROM ( {} ) {} WHERE {}",
                    items.join(", "),
                    sub_sql,
                    alias,
                    n.expr().to_sql(self.dialect, false)?
                ))
            }
            Operator::SelectColumns(_) | Operator::DropColumns(_) => {
                let (sub_sql, alias) = self.single_source(op, &using)?;
                let items = self.quote_all(&columns)?;
                Ok(format!(
                    "SELECT {} FROM ( {} ) {}",
                    items.join(", "),
                    sub_sql,
                    alias
                ))
            }
            Operator::Project(n) => {
                let (sub_sql, alias) = self.single_source(op, &using)?;
                let mut items = Vec::with_capacity(columns.len());
                for c in &columns {
                    match n.ops().iter().find(|(k, _)| k == *c) {
                        Some((_, e)) => items.push(format!(
                            "{} AS {}",
                            e.to_sql(self.dialect, false)?,
                            self.dialect.quote_identifier(c)?
                        )),
                        None => items.push(self.dialect.quote_identifier(c)?),
                    }
                }
                let mut sql = format!(
                    "SELECT {} FROM ( {} ) {}",
                    items.join(", "),
                    sub_sql,
                    alias
                );
                if !n.group_by().is_empty() {
                    let groups = self.quote_all(n.group_by())?;
                    sql.push_str(&format!(" GROUP BY {}", groups.join(", ")));
                }
                Ok(sql)
            }
            Operator::OrderRows(n) => {
                let (sub_sql, alias) = self.single_source(op, &using)?;
                let items = self.quote_all(&columns)?;
                let mut sql = format!(
                    "SELECT {} FROM ( {} ) {}",
                    items.join(", "),
                    sub_sql,
                    alias
                );
                if !n.order_by().is_empty() {
                    let terms = self.order_terms(n.order_by(), n.reverse())?;
                    sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
                }
                if let Some(limit) = n.limit() {
                    sql.push_str(&format!(" LIMIT {limit}"));
                }
                Ok(sql)
            }
            Operator::RenameColumns(n) => {
                let (sub_sql, alias) = self.single_source(op, &using)?;
                let mut items = Vec::with_capacity(columns.len());
                for c in &columns {
                    if n.is_renamed(c) {
                        items.push(format!(
                            "{} AS {}",
                            self.dialect.quote_identifier(n.old_name(c))?,
                            self.dialect.quote_identifier(c)?
                        ));
                    } else {
                        items.push(self.dialect.quote_identifier(c)?);
                    }
                }
                Ok(format!(
                    "SELECT {} FROM ( {} ) {}",
                    items.join(", "),
                    sub_sql,
                    alias
                ))
            }
            Operator::NaturalJoin(n) => {
                let sub = op.columns_used_from_sources(Some(&using))?;
                let (left_using, right_using) = (&sub[0], &sub[1]);
                let left_sql = self.compile(n.left(), Some(left_using))?;
                let right_sql = self.compile(n.right(), Some(right_using))?;
                let left_alias = self.dialect.quote_identifier(&self.next_alias("LQ"))?;
                let right_alias = self.dialect.quote_identifier(&self.next_alias("RQ"))?;

                let mut items = Vec::with_capacity(columns.len());
                for c in &columns {
                    let quoted = self.dialect.quote_identifier(c)?;
                    if left_using.contains(*c) && right_using.contains(*c) {
                        items.push(format!(
                            "COALESCE({left_alias}.{quoted}, {right_alias}.{quoted}) AS {quoted}"
                        ));
                    } else {
                        items.push(quoted);
                    }
                }
                let keys = self.quote_all(n.by())?;
                Ok(format!(
                    "SELECT {} FROM ( {} ) {} {} JOIN ( {} ) {} USING ( {} )",
                    items.join(", "),
                    left_sql,
                    left_alias,
                    n.jointype(),
                    right_sql,
                    right_alias,
                    keys.join(", ")
                ))
            }
        }
    }

    fn resolve_using(&self, op: &Operator, using: Option<&ColumnSet>) -> SqlResult<ColumnSet> {
        let using = match using {
            None => op.column_set(),
            Some(u) => {
                let unknown: Vec<&str> = u
                    .iter()
                    .filter(|c| !op.has_column(c))
                    .map(String::as_str)
                    .collect();
                if !unknown.is_empty() {
                    return Err(SqlError::UnknownColumns {
                        context: op.kind().to_string(),
                        columns: unknown.join(", "),
                    });
                }
                u.clone()
            }
        };
        if using.is_empty() {
            return Err(SqlError::EmptySelection {
                context: op.kind().to_string(),
            });
        }
        Ok(using)
    }

    /// Compile the single source of `op` for `using`, then allocate its alias
    fn single_source(
        &mut self,
        op: &Operator,
        using: &ColumnSet,
    ) -> SqlResult<(String, String)> {
        let sub = op.columns_used_from_sources(Some(using))?;
        let source = op.sources()[0];
        let sub_sql = self.compile(source, Some(&sub[0]))?;
        let alias = self.dialect.quote_identifier(&self.next_alias("SQ"))?;
        Ok((sub_sql, alias))
    }

    fn next_alias(&mut self, prefix: &str) -> String {
        let alias = format!("{prefix}_{}", self.temp_id);
        self.temp_id += 1;
        alias
    }

    fn quote_all<S: AsRef<str>>(&self, names: &[S]) -> SqlResult<Vec<String>> {
        names
            .iter()
            .map(|n| self.dialect.quote_identifier(n.as_ref()))
            .collect()
    }

    fn order_terms(&self, order_by: &[String], reverse: &[String]) -> SqlResult<Vec<String>> {
        order_by
            .iter()
            .map(|c| {
                let mut term = self.dialect.quote_identifier(c)?;
                if reverse.contains(c) {
                    term.push_str(" DESC");
                }
                if self.dialect.settings().nulls_last {
                    term.push_str(" NULLS LAST");
                }
                Ok(term)
            })
            .collect()
    }

    /// ` OVER (PARTITION BY .. ORDER BY ..)`, or ` OVER ()` for the whole table.
    ///
    /// Ordered aggregates span the whole partition, not the default running frame.
    fn window_term(
        &self,
        partition_by: &[String],
        order_by: &[String],
        reverse: &[String],
        aggregate: bool,
    ) -> SqlResult<String> {
        let mut parts = Vec::new();
        if !partition_by.is_empty() {
            parts.push(format!(
                "PARTITION BY {}",
                self.quote_all(partition_by)?.join(", ")
            ));
        }
        if !order_by.is_empty() {
            parts.push(format!(
                "ORDER BY {}",
                self.order_terms(order_by, reverse)?.join(", ")
            ));
            if aggregate {
                parts.push(
                    "ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING".to_string(),
                );
            }
        }
        Ok(format!(" OVER ({})", parts.join(" ")))
    }
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod tests;
