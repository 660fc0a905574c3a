//! Window assignments of an extend: `row_number` and broadcast aggregates

use ra_core::{Expression, Table, Value, Window};

use crate::error::{EvalError, EvalResult};
use crate::evaluator::{column_values, key_columns, sort_indices, split_groups};
use crate::functions::aggregate;

/// Values of one window call for every row of `source`, in source row order
///
/// Rows are ordered by partition then order columns, with the original row
/// position as the final tiebreak. An empty partition list is one group.
pub(crate) fn window_values(
    source: &Table,
    expr: &Expression,
    window: &Window,
) -> EvalResult<Vec<Value>> {
    let (op, args) = match expr {
        Expression::Operation { op, args, .. } => (op.as_str(), args.as_slice()),
        _ => {
            return Err(EvalError::NotImplemented(format!(
                "window expression '{}'",
                expr.to_source()
            )))
        }
    };
    let argument = match args {
        [] if op == "row_number" => None,
        [] => return Err(EvalError::NotImplemented(format!("window function '{op}'"))),
        [arg] => match arg.as_column() {
            Some(column) => Some(column_values(source, column)?),
            None => return Err(EvalError::WindowArgumentNotColumn { op: op.to_string() }),
        },
        _ => return Err(EvalError::WindowArgumentNotColumn { op: op.to_string() }),
    };

    let sort_columns: Vec<String> = window
        .partition_by
        .iter()
        .chain(&window.order_by)
        .cloned()
        .collect();
    let order = sort_indices(source, &sort_columns, &window.reverse)?;
    let partition = key_columns(source, &window.partition_by)?;
    let groups = split_groups(&order, &partition);
    log::trace!("window '{op}' over {} partitions", groups.len());

    let mut out = vec![Value::Null; source.num_rows()];
    for rows in groups {
        match argument {
            None => {
                for (rank, &i) in rows.iter().enumerate() {
                    out[i] = Value::Int(rank as i64 + 1);
                }
            }
            Some(values) => {
                let refs: Vec<&Value> = rows.iter().map(|&i| &values[i]).collect();
                let result = aggregate(op, &refs)?;
                for &i in &rows {
                    out[i] = result.clone();
                }
            }
        }
    }
    Ok(out)
}
