//! Expression tree attached to operator nodes
//!
//! Expressions are immutable once built. They can be constructed with the
//! combinator functions in this module ([`col`], [`lit`], operator overloads,
//! aggregate methods) or parsed from text with [`parse_expression`].
//! [`Expression::to_source`] renders text that parses back to the same tree;
//! the interchange form stores expressions that way.

mod context;
mod lexer;
mod parser;

pub use context::ExprContext;
pub use parser::parse_expression;

use crate::value::{format_float, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Operators rendered between their two arguments
pub const INFIX_OPS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "and", "or",
];

/// Functions that reduce a column to one value per group
pub const AGGREGATE_FUNCTIONS: &[&str] = &["sum", "mean", "avg", "min", "max", "count"];

/// Words that read as literals or operators in expression text
pub(crate) const KEYWORDS: &[&str] = &[
    "and", "or", "not", "true", "false", "null", "None", "nan", "inf",
];

/// Scalar or aggregate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Constant(Value),
    /// Reference to a column of the source
    Column(String),
    /// Operator or function application
    Operation {
        /// Operator or function name (`+`, `==`, `sum`, `row_number`, ...)
        op: String,
        /// Ordered arguments
        args: Vec<Expression>,
        /// Rendered as `(lhs op rhs)` when there are exactly two arguments
        infix: bool,
    },
}

impl Expression {
    /// Build a binary infix operation
    pub fn infix(op: impl Into<String>, lhs: Expression, rhs: Expression) -> Self {
        Expression::Operation {
            op: op.into(),
            args: vec![lhs, rhs],
            infix: true,
        }
    }

    /// Operator name, for operations
    pub fn op(&self) -> Option<&str> {
        match self {
            Expression::Operation { op, .. } => Some(op),
            _ => None,
        }
    }

    /// Arguments, empty for constants and columns
    pub fn args(&self) -> &[Expression] {
        match self {
            Expression::Operation { args, .. } => args,
            _ => &[],
        }
    }

    /// Column name, for column references
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Expression::Column(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this is an aggregate call (`sum(x)`, `count(x)`, ...)
    pub fn is_aggregate(&self) -> bool {
        match self {
            Expression::Operation {
                op, infix: false, ..
            } => AGGREGATE_FUNCTIONS.contains(&op.as_str()),
            _ => false,
        }
    }

    /// Whether this is evaluated over a window rather than row by row:
    /// an aggregate call or a zero-argument function such as `row_number()`
    pub fn is_window_call(&self) -> bool {
        match self {
            Expression::Operation {
                args, infix: false, ..
            } => args.is_empty() || self.is_aggregate(),
            _ => false,
        }
    }

    /// Add every referenced column name to `acc`
    pub fn collect_column_names(&self, acc: &mut BTreeSet<String>) {
        match self {
            Expression::Constant(_) => {}
            Expression::Column(name) => {
                acc.insert(name.clone());
            }
            Expression::Operation { args, .. } => {
                for a in args {
                    a.collect_column_names(acc);
                }
            }
        }
    }

    /// Referenced column names
    pub fn column_names(&self) -> BTreeSet<String> {
        let mut acc = BTreeSet::new();
        self.collect_column_names(&mut acc);
        acc
    }

    /// Text form understood by [`parse_expression`]
    pub fn to_source(&self) -> String {
        self.to_string()
    }

    fn binary(self, op: &str, rhs: impl Into<Expression>) -> Self {
        Expression::infix(op, self, rhs.into())
    }

    fn unary(self, op: &str) -> Self {
        call(op, vec![self])
    }

    /// `self == rhs`
    pub fn equals(self, rhs: impl Into<Expression>) -> Self {
        self.binary("==", rhs)
    }

    /// `self != rhs`
    pub fn not_equals(self, rhs: impl Into<Expression>) -> Self {
        self.binary("!=", rhs)
    }

    /// `self < rhs`
    pub fn lt(self, rhs: impl Into<Expression>) -> Self {
        self.binary("<", rhs)
    }

    /// `self <= rhs`
    pub fn le(self, rhs: impl Into<Expression>) -> Self {
        self.binary("<=", rhs)
    }

    /// `self > rhs`
    pub fn gt(self, rhs: impl Into<Expression>) -> Self {
        self.binary(">", rhs)
    }

    /// `self >= rhs`
    pub fn ge(self, rhs: impl Into<Expression>) -> Self {
        self.binary(">=", rhs)
    }

    /// Logical and
    pub fn and(self, rhs: impl Into<Expression>) -> Self {
        self.binary("and", rhs)
    }

    /// Logical or
    pub fn or(self, rhs: impl Into<Expression>) -> Self {
        self.binary("or", rhs)
    }

    /// Sum aggregate
    pub fn sum(self) -> Self {
        self.unary("sum")
    }

    /// Mean aggregate
    pub fn mean(self) -> Self {
        self.unary("mean")
    }

    /// Minimum aggregate
    pub fn min(self) -> Self {
        self.unary("min")
    }

    /// Maximum aggregate
    pub fn max(self) -> Self {
        self.unary("max")
    }

    /// Count of non-null values
    pub fn count(self) -> Self {
        self.unary("count")
    }

    /// Natural exponential
    pub fn exp(self) -> Self {
        self.unary("exp")
    }

    /// Natural logarithm
    pub fn log(self) -> Self {
        self.unary("log")
    }

    /// Square root
    pub fn sqrt(self) -> Self {
        self.unary("sqrt")
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        self.unary("abs")
    }

    /// Null test
    pub fn is_null(self) -> Self {
        self.unary("is_null")
    }
}

/// Reference a column
pub fn col(name: impl Into<String>) -> Expression {
    Expression::Column(name.into())
}

/// Literal value
pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Constant(value.into())
}

/// Function application rendered as `name(args...)`
pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Expression {
    Expression::Operation {
        op: name.into(),
        args,
        infix: false,
    }
}

/// 1-based row number within a window
pub fn row_number() -> Expression {
    call("row_number", Vec::new())
}

/// `if_else(condition, when_true, when_false)`
pub fn if_else(condition: Expression, when_true: Expression, when_false: Expression) -> Expression {
    call("if_else", vec![condition, when_true, when_false])
}

impl From<Value> for Expression {
    fn from(v: Value) -> Self {
        Expression::Constant(v)
    }
}

impl From<i64> for Expression {
    fn from(v: i64) -> Self {
        lit(v)
    }
}

impl From<i32> for Expression {
    fn from(v: i32) -> Self {
        lit(v)
    }
}

impl From<f64> for Expression {
    fn from(v: f64) -> Self {
        lit(v)
    }
}

impl From<bool> for Expression {
    fn from(v: bool) -> Self {
        lit(v)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:literal) => {
        impl<T: Into<Expression>> std::ops::$trait<T> for Expression {
            type Output = Expression;

            fn $method(self, rhs: T) -> Expression {
                Expression::infix($op, self, rhs.into())
            }
        }
    };
}

impl_binary_op!(Add, add, "+");
impl_binary_op!(Sub, sub, "-");
impl_binary_op!(Mul, mul, "*");
impl_binary_op!(Div, div, "/");
impl_binary_op!(Rem, rem, "%");

impl std::ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        call("not", vec![self])
    }
}

impl std::ops::Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        match self {
            Expression::Constant(Value::Int(i)) => i
                .checked_neg()
                .map_or_else(|| Expression::infix("-", lit(0), lit(i)), lit),
            Expression::Constant(Value::Float(f)) => lit(-f),
            other => Expression::infix("-", lit(0), other),
        }
    }
}

/// Whether `name` can be written without back-quotes
pub(crate) fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

fn write_literal(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    match v {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(i) => write!(f, "{i}"),
        Value::Float(x) => f.write_str(&format_float(*x)),
        Value::Str(s) => write!(f, "'{}'", s.replace('\'', "''")),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Constant(v) => write_literal(f, v),
            Expression::Column(name) if is_plain_identifier(name) => f.write_str(name),
            Expression::Column(name) => write!(f, "`{}`", name.replace('`', "``")),
            Expression::Operation { op, args, infix } if *infix && args.len() == 2 => {
                write!(f, "({} {} {})", args[0], op, args[1])
            }
            Expression::Operation { op, args, .. } => {
                write!(f, "{op}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{a}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
#[path = "expr_test.rs"]
mod tests;
