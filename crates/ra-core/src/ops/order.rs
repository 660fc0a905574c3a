//! Row ordering with an optional limit

use super::validate::{check_known, check_unique, into_names};
use super::{ColumnSet, Operator};
use crate::error::{format_columns, CoreError, CoreResult};

/// Sort specification for [`Operator::order_rows`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowOrder {
    pub order_by: Vec<String>,
    pub reverse: Vec<String>,
    pub limit: Option<usize>,
}

impl RowOrder {
    /// Ascending order on `columns`
    pub fn by<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order_by: into_names(columns),
            ..Self::default()
        }
    }

    /// Sort these order columns descending
    pub fn reverse<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reverse = into_names(columns);
        self
    }

    /// Keep at most `n` rows
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

#[derive(Debug, Clone)]
pub struct OrderRowsNode {
    source: Box<Operator>,
    order: RowOrder,
}

impl OrderRowsNode {
    pub(crate) fn new(source: Operator, order: RowOrder) -> CoreResult<Self> {
        check_unique("order_rows", &order.order_by)?;
        check_unique("reverse", &order.reverse)?;
        check_known("order_rows", &order.order_by, &source)?;
        let stray: Vec<&String> = order
            .reverse
            .iter()
            .filter(|c| !order.order_by.contains(c))
            .collect();
        if !stray.is_empty() {
            return Err(CoreError::ReverseNotInOrderBy {
                columns: format_columns(stray),
            });
        }
        Ok(Self {
            source: Box::new(source),
            order,
        })
    }

    pub fn source(&self) -> &Operator {
        &self.source
    }

    pub fn order_by(&self) -> &[String] {
        &self.order.order_by
    }

    pub fn reverse(&self) -> &[String] {
        &self.order.reverse
    }

    pub fn limit(&self) -> Option<usize> {
        self.order.limit
    }

    pub fn column_names(&self) -> &[String] {
        self.source.column_names()
    }

    pub(crate) fn columns_used(&self, using: &ColumnSet) -> ColumnSet {
        using
            .iter()
            .chain(&self.order.order_by)
            .cloned()
            .collect()
    }
}
