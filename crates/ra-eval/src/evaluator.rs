//! Per-node evaluation of operator pipelines over in-memory tables

use ra_core::{
    Column, DropColumnsNode, Expression, ExtendNode, Operator, OrderRowsNode, ProjectNode,
    RenameColumnsNode, SelectRowsNode, Table, TableDescription, Value,
};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{EvalError, EvalResult};
use crate::functions::{aggregate, eval_expr};
use crate::join::natural_join;
use crate::window::window_values;

/// Evaluate a pipeline against tables bound by table identity key
///
/// Unqualified tables are bound under their bare name; qualified ones under
/// [`TableDescription::key`].
///
/// ```
/// use ra_core::{col, Column, Operator, Table, TableDescription, Value};
/// use ra_eval::evaluate;
/// use std::collections::HashMap;
///
/// let d = TableDescription::new("d", ["x"]).unwrap();
/// let ops = Operator::from(d).extend([("y", col("x") * 2)]).unwrap();
///
/// let mut bindings = HashMap::new();
/// bindings.insert("d".to_string(), Table::new(vec![Column::new("x", [1i64, 2])]).unwrap());
///
/// let result = evaluate(&ops, &bindings).unwrap();
/// assert_eq!(result.values("y").unwrap(), &[Value::Int(2), Value::Int(4)]);
/// ```
pub fn evaluate(op: &Operator, bindings: &HashMap<String, Table>) -> EvalResult<Table> {
    let table = match op {
        Operator::Table(desc) => bind_table(desc, bindings)?,
        Operator::Extend(node) => extend(node, evaluate(node.source(), bindings)?)?,
        Operator::SelectRows(node) => select_rows(node, evaluate(node.source(), bindings)?)?,
        Operator::SelectColumns(node) => {
            evaluate(node.source(), bindings)?.select(node.column_names())?
        }
        Operator::DropColumns(node) => drop_columns(node, evaluate(node.source(), bindings)?)?,
        Operator::Project(node) => project(node, evaluate(node.source(), bindings)?)?,
        Operator::OrderRows(node) => order_rows(node, evaluate(node.source(), bindings)?)?,
        Operator::RenameColumns(node) => {
            rename_columns(node, evaluate(node.source(), bindings)?)?
        }
        Operator::NaturalJoin(node) => {
            let left = evaluate(node.left(), bindings)?;
            let right = evaluate(node.right(), bindings)?;
            natural_join(node, &left, &right)?
        }
    };
    log::trace!(
        "{} produced {} rows x {} columns",
        op.kind(),
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

fn bind_table(desc: &TableDescription, bindings: &HashMap<String, Table>) -> EvalResult<Table> {
    let bound = bindings
        .get(desc.key())
        .ok_or_else(|| EvalError::MissingTable {
            key: desc.key().to_string(),
        })?;
    let missing: Vec<&String> = desc
        .column_names()
        .iter()
        .filter(|c| bound.column(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(EvalError::MissingColumns {
            table: desc.key().to_string(),
            columns: quote_list(&missing),
        });
    }
    log::debug!(
        "bound table '{}' with {} rows",
        desc.key(),
        bound.num_rows()
    );
    Ok(bound.select(desc.column_names())?)
}

fn quote_list(names: &[&String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    format!("[{}]", quoted.join(", "))
}

fn extend(node: &ExtendNode, source: Table) -> EvalResult<Table> {
    // every assignment reads the source, never a sibling's result
    let mut results = Vec::with_capacity(node.ops().len());
    for (name, expr) in node.ops() {
        let values = if expr.is_window_call() {
            window_values(&source, expr, node.window())?
        } else {
            eval_expr(expr, &source)?
        };
        results.push((name, values));
    }
    let mut table = source;
    for (name, values) in results {
        table.set_column(name, values)?;
    }
    Ok(table.select(node.column_names())?)
}

fn select_rows(node: &SelectRowsNode, source: Table) -> EvalResult<Table> {
    let keep: Vec<usize> = eval_expr(node.expr(), &source)?
        .iter()
        .enumerate()
        .filter(|(_, v)| matches!(v, Value::Bool(true)))
        .map(|(i, _)| i)
        .collect();
    Ok(source.take(&keep))
}

fn drop_columns(node: &DropColumnsNode, mut source: Table) -> EvalResult<Table> {
    for c in node.column_deletions() {
        source.remove_column(c);
    }
    Ok(source)
}

fn rename_columns(node: &RenameColumnsNode, source: Table) -> EvalResult<Table> {
    let columns = node
        .column_names()
        .iter()
        .map(|name| {
            Ok(Column {
                name: name.clone(),
                values: column_values(&source, node.old_name(name))?.to_vec(),
            })
        })
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Table::new(columns)?)
}

fn order_rows(node: &OrderRowsNode, source: Table) -> EvalResult<Table> {
    let mut order = sort_indices(&source, node.order_by(), node.reverse())?;
    if let Some(limit) = node.limit() {
        order.truncate(limit);
    }
    Ok(source.take(&order))
}

fn project(node: &ProjectNode, source: Table) -> EvalResult<Table> {
    let mut arguments = Vec::with_capacity(node.ops().len());
    for (name, expr) in node.ops() {
        arguments.push((name, aggregate_call(expr)?));
    }

    let groups: Vec<Vec<usize>> = if node.group_by().is_empty() {
        vec![(0..source.num_rows()).collect()]
    } else {
        let order = sort_indices(&source, node.group_by(), &[])?;
        let keys = key_columns(&source, node.group_by())?;
        split_groups(&order, &keys)
    };
    log::debug!(
        "project over {} rows formed {} groups",
        source.num_rows(),
        groups.len()
    );

    let mut columns = Vec::with_capacity(node.column_names().len());
    for g in node.group_by() {
        let values = column_values(&source, g)?;
        columns.push(Column::new(
            g.clone(),
            groups.iter().map(|rows| values[rows[0]].clone()),
        ));
    }
    for (name, (op, arg)) in arguments {
        let values = column_values(&source, arg)?;
        let mut out = Vec::with_capacity(groups.len());
        for rows in &groups {
            let refs: Vec<&Value> = rows.iter().map(|&i| &values[i]).collect();
            out.push(aggregate(op, &refs)?);
        }
        columns.push(Column {
            name: name.clone(),
            values: out,
        });
    }
    Ok(Table::new(columns)?)
}

/// Split a project expression into its aggregate name and column argument
fn aggregate_call(expr: &Expression) -> EvalResult<(&str, &str)> {
    if let Expression::Operation {
        op,
        args,
        infix: false,
    } = expr
    {
        if let [arg] = args.as_slice() {
            if let Some(column) = arg.as_column() {
                return Ok((op.as_str(), column));
            }
        }
    }
    Err(EvalError::NonTrivialAggregate {
        context: "project".to_string(),
        op: expr.op().map_or_else(|| expr.to_source(), str::to_string),
    })
}

pub(crate) fn column_values<'t>(table: &'t Table, name: &str) -> EvalResult<&'t [Value]> {
    table.values(name).ok_or_else(|| EvalError::MissingColumns {
        table: "intermediate result".to_string(),
        columns: format!("['{name}']"),
    })
}

pub(crate) fn key_columns<'t>(table: &'t Table, names: &[String]) -> EvalResult<Vec<&'t [Value]>> {
    names.iter().map(|n| column_values(table, n)).collect()
}

/// Sort order with nulls last in either direction
pub(crate) fn order_cmp(a: &Value, b: &Value, descending: bool) -> Ordering {
    if descending && !a.is_missing() && !b.is_missing() {
        b.sort_cmp(a)
    } else {
        a.sort_cmp(b)
    }
}

/// Stable row order by `columns`, descending for those in `reverse`
pub(crate) fn sort_indices(
    table: &Table,
    columns: &[String],
    reverse: &[String],
) -> EvalResult<Vec<usize>> {
    let keys = key_columns(table, columns)?;
    let descending: Vec<bool> = columns.iter().map(|c| reverse.contains(c)).collect();
    let mut order: Vec<usize> = (0..table.num_rows()).collect();
    order.sort_by(|&i, &j| {
        keys.iter()
            .zip(&descending)
            .map(|(values, &desc)| order_cmp(&values[i], &values[j], desc))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(order)
}

/// Cut a sorted row order into runs of equal keys
pub(crate) fn split_groups(order: &[usize], keys: &[&[Value]]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for &i in order {
        let same = groups.last().is_some_and(|g| {
            let j = g[0];
            keys.iter().all(|values| values[i].sort_cmp(&values[j]).is_eq())
        });
        match groups.last_mut() {
            Some(g) if same => g.push(i),
            _ => groups.push(vec![i]),
        }
    }
    groups
}

#[cfg(test)]
#[path = "evaluator_test.rs"]
mod tests;
