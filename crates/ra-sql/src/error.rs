//! Error types for ra-sql

use ra_core::CoreError;
use thiserror::Error;

/// SQL generation, dialect and parsing errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Identifier contains the dialect's quote character (S002)
    #[error("[S002] identifier {ident:?} contains the quote character '{quote}'")]
    QuoteInIdentifier { ident: String, quote: char },

    /// Table qualifiers the dialect cannot render (S003)
    #[error("[S003] dialect '{dialect}' does not support table qualifiers: {qualifiers}")]
    QualifiersNotSupported { dialect: String, qualifiers: String },

    /// Compilation asked for no columns (S004)
    #[error("[S004] {context}: must select at least one column")]
    EmptySelection { context: String },

    /// Compilation asked for columns the node does not produce (S005)
    #[error("[S005] {context}: referred to unknown columns: {columns}")]
    UnknownColumns { context: String, columns: String },

    /// Dialect name not recognized (S006)
    #[error("[S006] unknown SQL dialect '{0}'")]
    UnknownDialect(String),

    /// Dialect config file not found (S007)
    #[error("[S007] dialect config not found: {path}")]
    ConfigNotFound { path: String },

    /// Dialect config could not be read or parsed (S008)
    #[error("[S008] invalid dialect config '{path}': {message}")]
    ConfigParse { path: String, message: String },

    /// Formatter received the wrong argument count (S009)
    #[error("[S009] '{op}' expects {expected} arguments, got {actual}")]
    ArgumentCount {
        op: String,
        expected: usize,
        actual: usize,
    },

    /// Error from the IR layer (S010)
    #[error("[S010] {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
