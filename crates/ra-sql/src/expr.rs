//! SQL text for expressions

use ra_core::Expression;

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};

/// Render as SQL text in a dialect
pub trait SqlExpr {
    /// `want_inline_parens` is false for top-level select items and WHERE
    /// conditions; nested operands pass true.
    fn to_sql(&self, dialect: &dyn SqlDialect, want_inline_parens: bool) -> SqlResult<String>;
}

impl SqlExpr for Expression {
    fn to_sql(&self, dialect: &dyn SqlDialect, want_inline_parens: bool) -> SqlResult<String> {
        match self {
            Expression::Constant(v) => Ok(dialect.render_literal(v)),
            Expression::Column(name) => dialect.quote_identifier(name),
            Expression::Operation { op, args, infix } => {
                let op = dialect.render_operator(op);
                if let Some(formatter) = dialect.formatters().get(op) {
                    return formatter(dialect, self);
                }
                if *infix && args.len() == 2 {
                    let lhs = args[0].to_sql(dialect, true)?;
                    let rhs = args[1].to_sql(dialect, true)?;
                    let text = format!("{lhs} {} {rhs}", op.to_uppercase());
                    return Ok(if want_inline_parens {
                        format!("({text})")
                    } else {
                        text
                    });
                }
                let rendered = args
                    .iter()
                    .map(|a| a.to_sql(dialect, true))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(format!("{}({})", op.to_uppercase(), rendered.join(", ")))
            }
        }
    }
}

fn check_arity(expr: &Expression, expected: usize) -> SqlResult<()> {
    let actual = expr.args().len();
    if actual == expected {
        Ok(())
    } else {
        Err(SqlError::ArgumentCount {
            op: expr.op().unwrap_or_default().to_string(),
            expected,
            actual,
        })
    }
}

/// `is_null(x)` as `(x IS NULL)`
pub fn format_is_null(dialect: &dyn SqlDialect, expr: &Expression) -> SqlResult<String> {
    check_arity(expr, 1)?;
    Ok(format!("({} IS NULL)", expr.args()[0].to_sql(dialect, true)?))
}

/// `if_else(c, a, b)` as `CASE WHEN c THEN a ELSE b END`
pub fn format_if_else(dialect: &dyn SqlDialect, expr: &Expression) -> SqlResult<String> {
    check_arity(expr, 3)?;
    let args = expr.args();
    Ok(format!(
        "CASE WHEN {} THEN {} ELSE {} END",
        args[0].to_sql(dialect, false)?,
        args[1].to_sql(dialect, false)?,
        args[2].to_sql(dialect, false)?
    ))
}

#[cfg(test)]
#[path = "expr_test.rs"]
mod tests;
