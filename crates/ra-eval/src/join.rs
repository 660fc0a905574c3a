//! Natural join by sorted-key merge

use ra_core::{Column, JoinType, NaturalJoinNode, Table, Value};
use std::cmp::Ordering;

use crate::error::EvalResult;
use crate::evaluator::key_columns;

fn key_at<'t>(keys: &[&'t [Value]], i: usize) -> Option<Vec<&'t Value>> {
    // a null in any key column never matches
    keys.iter()
        .map(|&values| Some(&values[i]).filter(|v| !v.is_missing()))
        .collect()
}

fn compare_keys(a: &[&Value], b: &[&Value]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.sort_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Join two evaluated sides on `node.by()`
///
/// Columns present on both sides, keys included, take the left value unless
/// it is null.
pub(crate) fn natural_join(
    node: &NaturalJoinNode,
    left: &Table,
    right: &Table,
) -> EvalResult<Table> {
    let left_keys = key_columns(left, node.by())?;
    let right_keys = key_columns(right, node.by())?;

    let mut sorted_right: Vec<(Vec<&Value>, usize)> = (0..right.num_rows())
        .filter_map(|j| key_at(&right_keys, j).map(|k| (k, j)))
        .collect();
    sorted_right.sort_by(|a, b| compare_keys(&a.0, &b.0));

    let keep_left = matches!(node.jointype(), JoinType::Left | JoinType::Full);
    let keep_right = matches!(node.jointype(), JoinType::Right | JoinType::Full);

    let mut pairs: Vec<(Option<usize>, Option<usize>)> = Vec::new();
    let mut right_matched = vec![false; right.num_rows()];
    for i in 0..left.num_rows() {
        let matches = match key_at(&left_keys, i) {
            Some(key) => {
                let lo = sorted_right.partition_point(|(k, _)| compare_keys(k, &key).is_lt());
                let hi = sorted_right.partition_point(|(k, _)| compare_keys(k, &key).is_le());
                &sorted_right[lo..hi]
            }
            None => &sorted_right[..0],
        };
        if matches.is_empty() && keep_left {
            pairs.push((Some(i), None));
        }
        for &(_, j) in matches {
            right_matched[j] = true;
            pairs.push((Some(i), Some(j)));
        }
    }
    if keep_right {
        pairs.extend(
            right_matched
                .iter()
                .enumerate()
                .filter(|(_, matched)| !**matched)
                .map(|(j, _)| (None, Some(j))),
        );
    }
    log::debug!(
        "{} join of {} and {} rows produced {} rows",
        node.jointype(),
        left.num_rows(),
        right.num_rows(),
        pairs.len()
    );

    let columns = node
        .column_names()
        .iter()
        .map(|name| {
            let l = left.values(name);
            let r = right.values(name);
            let values = pairs
                .iter()
                .map(|&(i, j)| {
                    let lv = l.zip(i).map(|(values, i)| &values[i]);
                    let rv = r.zip(j).map(|(values, j)| &values[j]);
                    match (lv, rv) {
                        (Some(v), _) if !v.is_null() => v.clone(),
                        (_, Some(v)) => v.clone(),
                        (Some(v), None) => v.clone(),
                        (None, None) => Value::Null,
                    }
                })
                .collect();
            Column {
                name: name.clone(),
                values,
            }
        })
        .collect();
    Ok(Table::new(columns)?)
}

#[cfg(test)]
#[path = "join_test.rs"]
mod tests;
