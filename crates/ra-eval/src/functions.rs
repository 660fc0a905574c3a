//! Row-wise expression evaluation and aggregate functions
//!
//! Nulls propagate through arithmetic and comparisons. `and`/`or`/`not` use
//! three-valued logic. `/` always yields a float, and dividing by zero gives
//! null.

use ra_core::{Expression, Table, Value};
use std::cmp::Ordering;

use crate::error::{EvalError, EvalResult};

/// Evaluate `expr` for every row of `table`
pub fn eval_expr(expr: &Expression, table: &Table) -> EvalResult<Vec<Value>> {
    let n = table.num_rows();
    match expr {
        Expression::Constant(v) => Ok(vec![v.clone(); n]),
        Expression::Column(name) => table
            .values(name)
            .map(<[Value]>::to_vec)
            .ok_or_else(|| EvalError::MissingColumns {
                table: "expression input".to_string(),
                columns: name.clone(),
            }),
        Expression::Operation { op, args, infix } => {
            if expr.is_window_call() {
                return Err(EvalError::MisplacedAggregate { op: op.clone() });
            }
            let evaluated = args
                .iter()
                .map(|a| eval_expr(a, table))
                .collect::<EvalResult<Vec<_>>>()?;
            let mut out = Vec::with_capacity(n);
            let mut row_args: Vec<&Value> = Vec::with_capacity(args.len());
            for i in 0..n {
                row_args.clear();
                row_args.extend(evaluated.iter().map(|column| &column[i]));
                let value = if *infix && row_args.len() == 2 {
                    binary(op, row_args[0], row_args[1])?
                } else {
                    call(op, &row_args)?
                };
                out.push(value);
            }
            Ok(out)
        }
    }
}

/// Apply an infix operator
pub fn binary(op: &str, a: &Value, b: &Value) -> EvalResult<Value> {
    match op {
        "and" => logic(op, a, b, |x, y| match (x, y) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        }),
        "or" => logic(op, a, b, |x, y| match (x, y) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        }),
        "==" | "!=" | "<" | "<=" | ">" | ">=" => Ok(compare(op, a, b)),
        "+" | "-" | "*" | "/" | "%" => arithmetic(op, a, b),
        _ => Err(EvalError::UnknownFunction {
            op: op.to_string(),
            arity: 2,
        }),
    }
}

fn logic(
    op: &str,
    a: &Value,
    b: &Value,
    combine: impl Fn(Option<bool>, Option<bool>) -> Option<bool>,
) -> EvalResult<Value> {
    let as_logic = |v: &Value| -> EvalResult<Option<bool>> {
        match v {
            Value::Null => Ok(None),
            Value::Bool(x) => Ok(Some(*x)),
            _ => Err(mismatch(op, a, b)),
        }
    };
    Ok(combine(as_logic(a)?, as_logic(b)?).map_or(Value::Null, Value::Bool))
}

fn compare(op: &str, a: &Value, b: &Value) -> Value {
    let Some(ordering) = a.compare(b) else {
        return Value::Null;
    };
    let result = match op {
        "==" => ordering == Ordering::Equal,
        "!=" => ordering != Ordering::Equal,
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    };
    Value::Bool(result)
}

fn arithmetic(op: &str, a: &Value, b: &Value) -> EvalResult<Value> {
    if a.is_null() || b.is_null() {
        return Ok(Value::Null);
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) if op != "/" => {
            let result = match op {
                "+" => x.checked_add(*y),
                "-" => x.checked_sub(*y),
                "*" => x.checked_mul(*y),
                _ => {
                    if *y == 0 {
                        return Ok(Value::Null);
                    }
                    x.checked_rem(*y)
                }
            };
            // overflow falls back to float arithmetic
            match result {
                Some(v) => Ok(Value::Int(v)),
                None => float_arithmetic(op, *x as f64, *y as f64),
            }
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => float_arithmetic(op, x, y),
            _ => Err(mismatch(op, a, b)),
        },
    }
}

fn float_arithmetic(op: &str, x: f64, y: f64) -> EvalResult<Value> {
    let v = match op {
        "+" => x + y,
        "-" => x - y,
        "*" => x * y,
        "/" | "%" if y == 0.0 => return Ok(Value::Null),
        "/" => x / y,
        _ => x % y,
    };
    Ok(Value::Float(v))
}

fn mismatch(op: &str, a: &Value, b: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.to_string(),
        left: a.type_name(),
        right: b.type_name(),
    }
}

fn unary_float(op: &str, v: &Value, f: impl Fn(f64) -> f64) -> EvalResult<Value> {
    match v {
        Value::Null => Ok(Value::Null),
        other => match other.as_f64() {
            Some(x) => Ok(Value::Float(f(x))),
            None => Err(mismatch(op, other, &Value::Null)),
        },
    }
}

fn arity(op: &str, args: &[&Value], expected: usize) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::UnknownFunction {
            op: op.to_string(),
            arity: args.len(),
        })
    }
}

/// Apply a named scalar function to one row's arguments
pub fn call(op: &str, args: &[&Value]) -> EvalResult<Value> {
    match op {
        "not" => {
            arity(op, args, 1)?;
            match args[0] {
                Value::Null => Ok(Value::Null),
                Value::Bool(b) => Ok(Value::Bool(!b)),
                other => Err(mismatch(op, other, &Value::Null)),
            }
        }
        "neg" => {
            arity(op, args, 1)?;
            match args[0] {
                Value::Int(i) => Ok(i
                    .checked_neg()
                    .map_or(Value::Float(-(*i as f64)), Value::Int)),
                other => unary_float(op, other, |x| -x),
            }
        }
        "abs" => {
            arity(op, args, 1)?;
            match args[0] {
                Value::Int(i) => Ok(i
                    .checked_abs()
                    .map_or(Value::Float((*i as f64).abs()), Value::Int)),
                other => unary_float(op, other, f64::abs),
            }
        }
        "exp" => {
            arity(op, args, 1)?;
            unary_float(op, args[0], f64::exp)
        }
        "log" | "ln" => {
            arity(op, args, 1)?;
            unary_float(op, args[0], f64::ln)
        }
        "sqrt" => {
            arity(op, args, 1)?;
            unary_float(op, args[0], f64::sqrt)
        }
        "floor" => {
            arity(op, args, 1)?;
            unary_float(op, args[0], f64::floor)
        }
        "ceil" => {
            arity(op, args, 1)?;
            unary_float(op, args[0], f64::ceil)
        }
        "round" => {
            arity(op, args, 1)?;
            unary_float(op, args[0], f64::round)
        }
        "is_null" => {
            arity(op, args, 1)?;
            Ok(Value::Bool(args[0].is_null()))
        }
        "if_else" => {
            arity(op, args, 3)?;
            match args[0] {
                Value::Null => Ok(Value::Null),
                Value::Bool(true) => Ok(args[1].clone()),
                Value::Bool(false) => Ok(args[2].clone()),
                other => Err(mismatch(op, other, &Value::Null)),
            }
        }
        "coalesce" => Ok(args
            .iter()
            .find(|v| !v.is_null())
            .map_or(Value::Null, |v| (*v).clone())),
        _ => Err(EvalError::UnknownFunction {
            op: op.to_string(),
            arity: args.len(),
        }),
    }
}

/// Reduce values with a named aggregate; nulls are skipped and an empty
/// input gives null (`count` gives 0).
pub fn aggregate(op: &str, values: &[&Value]) -> EvalResult<Value> {
    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();
    match op {
        "count" => Ok(Value::Int(present.len() as i64)),
        "sum" => {
            if present.is_empty() {
                return Ok(Value::Null);
            }
            let mut total = Value::Int(0);
            for v in present {
                total = arithmetic("+", &total, v)?;
            }
            Ok(total)
        }
        "mean" | "avg" => {
            if present.is_empty() {
                return Ok(Value::Null);
            }
            let mut total = 0.0;
            for v in &present {
                total += v
                    .as_f64()
                    .ok_or_else(|| mismatch(op, v, &Value::Null))?;
            }
            Ok(Value::Float(total / present.len() as f64))
        }
        "min" | "max" => {
            let want = if op == "min" {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut best: Option<&Value> = None;
            for v in present {
                best = match best {
                    Some(b) if v.compare(b) != Some(want) => Some(b),
                    _ => Some(v),
                };
            }
            Ok(best.cloned().unwrap_or(Value::Null))
        }
        _ => Err(EvalError::NotImplemented(format!("aggregate '{op}'"))),
    }
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
