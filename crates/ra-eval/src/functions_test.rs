use super::*;
use ra_core::{col, lit, Column};

fn table() -> Table {
    Table::new(vec![
        Column::new("x", [Value::Int(1), Value::Int(4), Value::Null]),
        Column::new("y", [Value::Float(0.5), Value::Float(2.0), Value::Float(1.0)]),
        Column::new("b", [Value::Bool(true), Value::Null, Value::Bool(false)]),
    ])
    .unwrap()
}

#[test]
fn test_arithmetic_and_null_propagation() {
    let t = table();
    assert_eq!(
        eval_expr(&(col("x") + 1), &t).unwrap(),
        vec![Value::Int(2), Value::Int(5), Value::Null]
    );
    assert_eq!(
        eval_expr(&(col("x") * col("y")), &t).unwrap(),
        vec![Value::Float(0.5), Value::Float(8.0), Value::Null]
    );
}

#[test]
fn test_division_is_float_and_zero_divisor_is_null() {
    assert_eq!(
        binary("/", &Value::Int(3), &Value::Int(2)).unwrap(),
        Value::Float(1.5)
    );
    assert_eq!(
        binary("/", &Value::Int(3), &Value::Int(0)).unwrap(),
        Value::Null
    );
    assert_eq!(
        binary("%", &Value::Int(7), &Value::Int(3)).unwrap(),
        Value::Int(1)
    );
}

#[test]
fn test_int_overflow_falls_back_to_float() {
    let v = binary("+", &Value::Int(i64::MAX), &Value::Int(1)).unwrap();
    assert!(matches!(v, Value::Float(_)));
}

#[test]
fn test_comparisons() {
    assert_eq!(
        binary("<", &Value::Int(1), &Value::Float(1.5)).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        binary("==", &Value::Str("a".into()), &Value::Str("a".into())).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(binary(">=", &Value::Null, &Value::Int(1)).unwrap(), Value::Null);
}

#[test]
fn test_three_valued_logic() {
    let t = Value::Bool(true);
    let f = Value::Bool(false);
    let n = Value::Null;
    assert_eq!(binary("and", &f, &n).unwrap(), f);
    assert_eq!(binary("and", &t, &n).unwrap(), n);
    assert_eq!(binary("or", &t, &n).unwrap(), t);
    assert_eq!(binary("or", &f, &n).unwrap(), n);
    assert_eq!(call("not", &[&n]).unwrap(), n);
    assert!(matches!(
        binary("and", &Value::Int(1), &t),
        Err(EvalError::TypeMismatch { .. })
    ));
}

#[test]
fn test_scalar_functions() {
    assert_eq!(call("abs", &[&Value::Int(-3)]).unwrap(), Value::Int(3));
    assert_eq!(call("sqrt", &[&Value::Int(9)]).unwrap(), Value::Float(3.0));
    assert_eq!(call("floor", &[&Value::Float(2.7)]).unwrap(), Value::Float(2.0));
    assert_eq!(call("exp", &[&Value::Null]).unwrap(), Value::Null);
    assert_eq!(
        call("coalesce", &[&Value::Null, &Value::Int(2), &Value::Int(3)]).unwrap(),
        Value::Int(2)
    );
    assert_eq!(
        call("if_else", &[&Value::Bool(false), &Value::Int(1), &Value::Int(2)]).unwrap(),
        Value::Int(2)
    );
    assert_eq!(call("is_null", &[&Value::Null]).unwrap(), Value::Bool(true));
    assert!(matches!(
        call("frobnicate", &[&Value::Int(1)]),
        Err(EvalError::UnknownFunction { .. })
    ));
    assert!(matches!(
        call("exp", &[&Value::Str("x".into())]),
        Err(EvalError::TypeMismatch { .. })
    ));
}

#[test]
fn test_not_over_column() {
    let t = table();
    assert_eq!(
        eval_expr(&!col("b"), &t).unwrap(),
        vec![Value::Bool(false), Value::Null, Value::Bool(true)]
    );
}

#[test]
fn test_aggregate_outside_window_is_rejected() {
    let err = eval_expr(&(col("x").sum() + lit(1)), &table()).unwrap_err();
    assert!(matches!(err, EvalError::MisplacedAggregate { ref op } if op == "sum"));
}

#[test]
fn test_aggregates_skip_nulls() {
    let values = [Value::Int(1), Value::Null, Value::Int(4)];
    let refs: Vec<&Value> = values.iter().collect();
    assert_eq!(aggregate("sum", &refs).unwrap(), Value::Int(5));
    assert_eq!(aggregate("count", &refs).unwrap(), Value::Int(2));
    assert_eq!(aggregate("mean", &refs).unwrap(), Value::Float(2.5));
    assert_eq!(aggregate("avg", &refs).unwrap(), Value::Float(2.5));
    assert_eq!(aggregate("min", &refs).unwrap(), Value::Int(1));
    assert_eq!(aggregate("max", &refs).unwrap(), Value::Int(4));

    let empty: Vec<&Value> = Vec::new();
    assert_eq!(aggregate("sum", &empty).unwrap(), Value::Null);
    assert_eq!(aggregate("count", &empty).unwrap(), Value::Int(0));
    assert!(matches!(
        aggregate("median", &refs),
        Err(EvalError::NotImplemented(_))
    ));
}
