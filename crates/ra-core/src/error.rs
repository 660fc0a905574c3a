//! Error types for ra-core

use thiserror::Error;

/// Core error type for Relalg
///
/// Construction errors (C001-C012) are raised while a pipeline is being built,
/// before anything is compiled or evaluated.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: A column list that must be non-empty was empty
    #[error("[C001] {context}: no column names")]
    EmptyColumnList { context: String },

    /// C002: A column name was repeated where names must be unique
    #[error("[C002] {context}: duplicate column name '{column}'")]
    DuplicateColumn { context: String, column: String },

    /// C003: Columns referenced that the source does not provide
    #[error("[C003] {context}: referred to unknown columns: {columns}")]
    UnknownColumns { context: String, columns: String },

    /// C004: Reverse columns must be a subset of the order-by columns
    #[error("[C004] reverse columns not in order_by: {columns}")]
    ReverseNotInOrderBy { columns: String },

    /// C005: A node that needs operations was given none
    #[error("[C005] {context}: no operations")]
    NoOperations { context: String },

    /// C006: Join keys missing from one side of a join
    #[error("[C006] {side} table missing join keys: {columns}")]
    JoinKeyMissing { side: String, columns: String },

    /// C007: An operation assigns to a column it also uses as a window key
    #[error("[C007] extend: cannot assign to window column '{column}'")]
    AssignsWindowColumn { column: String },

    /// C008: Rename mapping would produce a column name twice
    #[error("[C008] rename_columns: new name '{column}' collides with an existing column")]
    RenameCollision { column: String },

    /// C009: Expression text could not be parsed
    #[error("[C009] expression parse error at offset {offset}: {message}")]
    ExprParse { offset: usize, message: String },

    /// C010: Identifier in expression text is neither a column nor a named value
    #[error("[C010] unknown name '{name}' (not a column or a context value)")]
    UnknownName { name: String },

    /// C011: Table data is malformed (ragged columns, duplicate names, ...)
    #[error("[C011] invalid table: {message}")]
    InvalidTable { message: String },

    /// C012: Two table descriptions share a key but disagree on columns
    #[error("[C012] conflicting definitions for table '{key}'")]
    ConflictingTable { key: String },

    /// C013: Interchange representation is malformed
    #[error("[C013] invalid pipeline representation: {message}")]
    InvalidRepresentation { message: String },

    /// C014: IO error with file path context
    #[error("[C014] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C015: YAML encode/decode error
    #[error("[C015] YAML error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// C016: JSON encode/decode error
    #[error("[C016] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Render a list of column names for error messages: `['a', 'b']`
pub(crate) fn format_columns<'a, I>(columns: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let quoted: Vec<String> = columns.into_iter().map(|c| format!("'{c}'")).collect();
    format!("[{}]", quoted.join(", "))
}
