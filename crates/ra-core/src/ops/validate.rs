//! Construction-time checks shared by the node types

use super::Operator;
use crate::error::{format_columns, CoreError, CoreResult};
use std::collections::HashSet;

/// Collect anything string-like into owned names
pub(crate) fn into_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

/// Reject repeated names
pub(crate) fn check_unique<'a, I>(context: &str, names: I) -> CoreResult<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CoreError::DuplicateColumn {
                context: context.to_string(),
                column: name.clone(),
            });
        }
    }
    Ok(())
}

/// A node's output column list: non-empty, no duplicates
pub(crate) fn check_column_list(context: &str, columns: &[String]) -> CoreResult<()> {
    if columns.is_empty() {
        return Err(CoreError::EmptyColumnList {
            context: context.to_string(),
        });
    }
    check_unique(context, columns)
}

/// Every name in `wanted` must be a column of `source`
pub(crate) fn check_known<'a, I>(context: &str, wanted: I, source: &Operator) -> CoreResult<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let missing: Vec<&String> = wanted
        .into_iter()
        .filter(|c| !source.has_column(c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::UnknownColumns {
            context: context.to_string(),
            columns: format_columns(missing),
        })
    }
}
