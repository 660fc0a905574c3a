//! Error types for ra-eval

use arrow::error::ArrowError;
use ra_core::CoreError;
use thiserror::Error;

/// Evaluation errors
#[derive(Error, Debug)]
pub enum EvalError {
    /// No table bound for a table description (EV001)
    #[error("[EV001] no table bound for '{key}'")]
    MissingTable { key: String },

    /// Bound table lacks declared columns (EV002)
    #[error("[EV002] table '{table}' is missing columns: {columns}")]
    MissingColumns { table: String, columns: String },

    /// Aggregate argument is not a plain column reference (EV003)
    #[error("[EV003] {context}: aggregate '{op}' must take a single column argument")]
    NonTrivialAggregate { context: String, op: String },

    /// Window function argument is not a plain column reference (EV004)
    #[error("[EV004] window function '{op}' must take a single column argument")]
    WindowArgumentNotColumn { op: String },

    /// Function recognized but not supported by the evaluator (EV005)
    #[error("[EV005] '{0}' is not implemented")]
    NotImplemented(String),

    /// Function name not recognized (EV006)
    #[error("[EV006] unknown function '{op}' with {arity} argument(s)")]
    UnknownFunction { op: String, arity: usize },

    /// Operand types do not fit the operation (EV007)
    #[error("[EV007] '{op}' cannot be applied to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },

    /// Aggregate used where row-wise values are expected (EV008)
    #[error("[EV008] aggregate '{op}' is only allowed as a whole extend assignment or in project")]
    MisplacedAggregate { op: String },

    /// Arrow conversion error (EV009)
    #[error("[EV009] Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error from the IR layer (EV010)
    #[error("[EV010] {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for EvalError
pub type EvalResult<T> = Result<T, EvalError>;
