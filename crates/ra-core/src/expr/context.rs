//! Named values visible to expression text

use crate::value::Value;
use std::collections::BTreeMap;

/// Explicit set of named values an expression may refer to.
///
/// Names are resolved after source columns, so a column always shadows a
/// context value of the same name. Resolved names are inlined as constants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprContext {
    values: BTreeMap<String, Value>,
}

impl ExprContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a named value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a named value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}
