use super::*;
use crate::expr::{col, lit, row_number};

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn parse(source: &str) -> Expression {
    parse_expression(source, &cols(&["x", "y", "z", "Sepal.Length"]), &ExprContext::new())
        .unwrap()
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert_eq!(parse("x + y * 2"), col("x") + col("y") * 2);
    assert_eq!(parse("(x + y) * 2"), (col("x") + col("y")) * 2);
}

#[test]
fn test_left_associative() {
    assert_eq!(parse("x - y - z"), (col("x") - col("y")) - col("z"));
    assert_eq!(parse("x / y / 2"), (col("x") / col("y")) / 2);
}

#[test]
fn test_comparison_below_arithmetic_and_above_logic() {
    let expected = (col("x") + 1).gt(col("y")).and(col("z").equals(2));
    assert_eq!(parse("x + 1 > y and z == 2"), expected);
    assert_eq!(parse("x + 1 > y & z == 2"), expected);
}

#[test]
fn test_or_is_loosest() {
    let expected = col("x").equals(1).or(col("y").equals(2).and(col("z").equals(3)));
    assert_eq!(parse("x == 1 or y == 2 and z == 3"), expected);
}

#[test]
fn test_not_wraps_comparison() {
    assert_eq!(parse("not x == 1"), !col("x").equals(1));
    assert_eq!(parse("!(x == 1)"), !col("x").equals(1));
}

#[test]
fn test_unary_minus() {
    assert_eq!(parse("-3"), lit(-3));
    assert_eq!(parse("-2.5"), lit(-2.5));
    assert_eq!(parse("-x"), -col("x"));
    assert_eq!(parse("x - -1"), col("x") - lit(-1));
}

#[test]
fn test_method_call_is_function_sugar() {
    assert_eq!(parse("x.sum()"), col("x").sum());
    assert_eq!(parse("sum(x)"), col("x").sum());
    assert_eq!(parse("(x * 0.237).exp()"), (col("x") * 0.237).exp());
    assert_eq!(parse("row_number()"), row_number());
}

#[test]
fn test_literals() {
    assert_eq!(parse("'it''s'"), lit("it's"));
    assert_eq!(parse("\"double\""), lit("double"));
    assert_eq!(parse("true"), lit(true));
    assert_eq!(parse("null"), lit(Value::Null));
    assert_eq!(parse("1e3"), lit(1000.0));
}

#[test]
fn test_back_quoted_column() {
    assert_eq!(parse("`Sepal.Length` * 2"), col("Sepal.Length") * 2);
}

#[test]
fn test_context_values_are_inlined() {
    let ctx = ExprContext::new().with("scale", 0.5).with("x", 100);
    let e = parse_expression("x * scale", &cols(&["x"]), &ctx).unwrap();
    // the column shadows the context value of the same name
    assert_eq!(e, col("x") * 0.5);
}

#[test]
fn test_unknown_name() {
    let err = parse_expression("q + 1", &cols(&["x"]), &ExprContext::new()).unwrap_err();
    assert!(matches!(err, CoreError::UnknownName { ref name } if name == "q"));
}

#[test]
fn test_syntax_errors() {
    for bad in ["x +", "(x", "x y", "x = 1", "'open", "x.(1)"] {
        let result = parse_expression(bad, &cols(&["x", "y"]), &ExprContext::new());
        assert!(result.is_err(), "expected error for {bad:?}");
    }
}

#[test]
fn test_source_round_trip() {
    let exprs = vec![
        (col("x") + col("y") * 2).gt(lit(0.5)),
        !(col("x").equals(lit("a'b"))),
        -(col("x") / col("y")),
        col("Sepal.Length").mean(),
        row_number(),
        crate::expr::if_else(col("x").is_null(), lit(0), col("x")),
        lit(1.0) + lit(-2) + lit(1e20),
    ];
    for e in exprs {
        let source = e.to_source();
        assert_eq!(parse(&source), e, "round trip of {source}");
    }
}

#[test]
fn test_integer_extremes() {
    assert_eq!(parse("-9223372036854775808"), lit(i64::MIN));
    assert_eq!(parse("9223372036854775807"), lit(i64::MAX));
    // one past i64::MAX only fits a float
    assert_eq!(parse("9223372036854775808"), lit(9223372036854775808.0));

    // negating an inlined i64::MIN keeps it as a subtraction
    let ctx = ExprContext::new().with("m", i64::MIN);
    let e = parse_expression("-m", &cols(&["x"]), &ctx).unwrap();
    assert_eq!(e, Expression::infix("-", lit(0), lit(i64::MIN)));

    for e in [lit(i64::MIN), -lit(i64::MIN), col("x") - lit(i64::MIN)] {
        let source = e.to_source();
        assert_eq!(parse(&source), e, "round trip of {source}");
    }
}
