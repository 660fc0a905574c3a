//! End-to-end evaluation of parsed pipelines

use ra_core::repr::{from_yaml, to_yaml};
use ra_core::{
    Column, ExprContext, JoinType, Operator, RowOrder, Table, TableDescription, Value, Window,
};
use ra_eval::{evaluate, table_from_record_batch, table_to_record_batch};
use std::collections::HashMap;

fn survey() -> Table {
    Table::new(vec![
        Column::new("subjectID", [1i64, 1, 2, 2]),
        Column::new(
            "surveyCategory",
            [
                "withdrawal behavior",
                "positive re-framing",
                "withdrawal behavior",
                "positive re-framing",
            ],
        ),
        Column::new("assessmentTotal", [5i64, 2, 3, 4]),
        Column::new("irrelevantCol1", ["irrel1"; 4]),
        Column::new("irrelevantCol2", ["irrel2"; 4]),
    ])
    .unwrap()
}

fn scoring_pipeline() -> Operator {
    let ctx = ExprContext::new().with("scale", 0.237);
    let d = Operator::from(
        TableDescription::new(
            "d",
            [
                "subjectID",
                "surveyCategory",
                "assessmentTotal",
                "irrelevantCol1",
                "irrelevantCol2",
            ],
        )
        .unwrap(),
    );
    let probability = d.parse("(assessmentTotal * scale).exp()", &ctx).unwrap();
    let ops = d.extend([("probability", probability)]).unwrap();
    let total = ops.parse("probability.sum()", &ctx).unwrap();
    let ops = ops
        .extend_window([("total", total)], Window::new().partition_by(["subjectID"]))
        .unwrap();
    let normalized = ops.parse("probability / total", &ctx).unwrap();
    let ops = ops.extend([("probability", normalized)]).unwrap();
    let rank = ops.parse("row_number()", &ctx).unwrap();
    let ops = ops
        .extend_window(
            [("row_number", rank)],
            Window::new()
                .partition_by(["subjectID"])
                .order_by(["probability", "surveyCategory"])
                .reverse(["probability"]),
        )
        .unwrap();
    let first = ops.parse("row_number == 1", &ctx).unwrap();
    ops.select_rows(first)
        .unwrap()
        .select_columns(["subjectID", "surveyCategory", "probability"])
        .unwrap()
        .rename_columns([("diagnosis", "surveyCategory")])
        .unwrap()
        .order_rows(RowOrder::by(["subjectID"]))
        .unwrap()
}

fn bindings() -> HashMap<String, Table> {
    let mut bindings = HashMap::new();
    bindings.insert("d".to_string(), survey());
    bindings
}

#[test]
fn test_scoring_example() {
    let result = evaluate(&scoring_pipeline(), &bindings()).unwrap();
    let expected = Table::new(vec![
        Column::new("subjectID", [1i64, 2]),
        Column::new("diagnosis", ["withdrawal behavior", "positive re-framing"]),
        Column::new("probability", [0.670622, 0.558974]),
    ])
    .unwrap();
    assert!(
        result.equivalent(&expected, 1e-3),
        "unexpected result {result:?}"
    );
    assert_eq!(
        result.column_names(),
        vec!["subjectID", "diagnosis", "probability"]
    );
}

#[test]
fn test_round_tripped_pipeline_evaluates_the_same() {
    let ops = scoring_pipeline();
    let back = from_yaml(&to_yaml(&ops).unwrap()).unwrap();
    assert_eq!(
        evaluate(&back, &bindings()).unwrap(),
        evaluate(&ops, &bindings()).unwrap()
    );
}

#[test]
fn test_join_then_project() {
    let weights = Table::new(vec![
        Column::new("subjectID", [1i64, 2, 3]),
        Column::new("weight", [2.0, 0.5, 9.0]),
    ])
    .unwrap();
    let mut bindings = bindings();
    bindings.insert("w".to_string(), weights);

    let w = Operator::from(TableDescription::new("w", ["subjectID", "weight"]).unwrap());
    let ops = scoring_pipeline()
        .natural_join(w, ["subjectID"], JoinType::Full)
        .unwrap()
        .project_grouped(
            [
                ("n", ra_core::col("weight").count()),
                ("best", ra_core::col("probability").max()),
            ],
            ["diagnosis"],
        )
        .unwrap();
    let result = evaluate(&ops, &bindings).unwrap();
    // subject 3 only exists on the right, so its diagnosis is null and sorts last
    assert_eq!(
        result.values("diagnosis").unwrap(),
        &[
            Value::from("positive re-framing"),
            Value::from("withdrawal behavior"),
            Value::Null
        ]
    );
    assert_eq!(
        result.values("n").unwrap(),
        &[Value::Int(1), Value::Int(1), Value::Int(1)]
    );
}

#[test]
fn test_result_survives_arrow_conversion() {
    let result = evaluate(&scoring_pipeline(), &bindings()).unwrap();
    let batch = table_to_record_batch(&result).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(table_from_record_batch(&batch).unwrap(), result);
}
