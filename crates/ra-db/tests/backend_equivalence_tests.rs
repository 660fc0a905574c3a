//! The evaluator and compiled SQL on DuckDB agree on row sets

use ra_core::{
    col, lit, row_number, Column, JoinType, Operator, RowOrder, Table, TableDescription, Value,
    Window,
};
use ra_db::{load_tables, query_pipeline, DuckDbBackend};
use ra_eval::evaluate;
use ra_sql::DuckDbDialect;
use std::collections::HashMap;

fn d() -> Operator {
    Operator::from(TableDescription::new("d", ["subjectID", "category", "score"]).unwrap())
}

fn w() -> Operator {
    Operator::from(TableDescription::new("w", ["subjectID", "category", "weight"]).unwrap())
}

fn bindings() -> HashMap<String, Table> {
    let d = Table::from_rows(
        ["subjectID", "category", "score"],
        vec![
            vec![Value::Int(1), Value::from("A"), Value::Int(5)],
            vec![Value::Int(1), Value::from("B"), Value::Int(2)],
            vec![Value::Int(2), Value::from("A"), Value::Int(3)],
            vec![Value::Int(3), Value::from("C"), Value::Null],
            vec![Value::Null, Value::from("B"), Value::Int(4)],
        ],
    )
    .unwrap();
    let w = Table::new(vec![
        Column::new("subjectID", [Value::Int(1), Value::Int(2), Value::Int(4), Value::Null]),
        Column::new("category", [Value::Null, Value::from("Z"), Value::from("D"), Value::from("N")]),
        Column::new("weight", [0.5, 2.0, 1.5, 9.0]),
    ])
    .unwrap();
    let mut bindings = HashMap::new();
    bindings.insert("d".to_string(), d);
    bindings.insert("w".to_string(), w);
    bindings
}

async fn assert_backends_agree(ops: &Operator) {
    let bindings = bindings();
    let expected = evaluate(ops, &bindings).unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    let dialect = DuckDbDialect::new();
    load_tables(&db, ops, &dialect, &bindings).await.unwrap();
    let actual = query_pipeline(&db, ops, &dialect).await.unwrap();

    assert!(
        actual.equivalent(&expected, 1e-9),
        "DuckDB gave {actual:?}\nevaluator gave {expected:?}"
    );
}

#[tokio::test]
async fn test_scenario() {
    let ops = d()
        .extend_window(
            [("total", col("score").sum())],
            Window::new().partition_by(["subjectID"]),
        )
        .unwrap()
        .extend([("p", col("score") / col("total"))])
        .unwrap()
        .select_rows(col("p").gt(0.5))
        .unwrap();
    assert_backends_agree(&ops).await;
}

#[tokio::test]
async fn test_row_number_and_filters() {
    let ops = d()
        .extend_window(
            [("rank", row_number())],
            Window::new()
                .partition_by(["subjectID"])
                .order_by(["score", "category"])
                .reverse(["score"]),
        )
        .unwrap()
        .select_rows(col("rank").equals(1).or(col("score").is_null()))
        .unwrap()
        .drop_columns(["rank"])
        .unwrap();
    assert_backends_agree(&ops).await;
}

#[tokio::test]
async fn test_ordered_window_aggregates_cover_the_partition() {
    let ops = d()
        .extend_window(
            [
                ("total", col("score").sum()),
                ("low", col("score").min()),
                ("n", col("score").count()),
                ("rank", row_number()),
            ],
            Window::new()
                .partition_by(["subjectID"])
                .order_by(["score", "category"]),
        )
        .unwrap();
    assert_backends_agree(&ops).await;

    let whole_table = d()
        .extend_window(
            [("total", col("score").sum())],
            Window::new().order_by(["score"]),
        )
        .unwrap();
    assert_backends_agree(&whole_table).await;
}

#[tokio::test]
async fn test_arithmetic_and_null_handling() {
    let ops = d()
        .extend([
            ("half", col("score") / lit(2)),
            ("shifted", (col("score") - 1) * 2),
            ("big", col("score").ge(3).and(!col("category").equals(lit("C")))),
        ])
        .unwrap();
    assert_backends_agree(&ops).await;
}

#[tokio::test]
async fn test_project() {
    let grouped = d()
        .project_grouped(
            [
                ("total", col("score").sum()),
                ("mean", col("score").mean()),
                ("n", col("score").count()),
                ("low", col("score").min()),
            ],
            ["subjectID"],
        )
        .unwrap();
    assert_backends_agree(&grouped).await;

    let global = d().project([("high", col("score").max())]).unwrap();
    assert_backends_agree(&global).await;
}

#[tokio::test]
async fn test_joins() {
    for jointype in [JoinType::Inner, JoinType::Left, JoinType::Right, JoinType::Full] {
        let ops = d()
            .natural_join(w(), ["subjectID"], jointype)
            .unwrap()
            .rename_columns([("label", "category")])
            .unwrap();
        assert_backends_agree(&ops).await;
    }
}

#[tokio::test]
async fn test_order_with_limit() {
    let ops = d()
        .select_columns(["category", "score"])
        .unwrap()
        .order_rows(RowOrder::by(["score", "category"]).reverse(["score"]).limit(3))
        .unwrap();
    assert_backends_agree(&ops).await;
}
