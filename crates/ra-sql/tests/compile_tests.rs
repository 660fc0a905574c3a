//! Compiler properties checked across dialects and the interchange form

use ra_core::repr::{from_json, from_yaml, to_json, to_yaml};
use ra_core::{col, lit, row_number, ColumnSet, JoinType, Operator, RowOrder, TableDescription, Window};
use ra_sql::{dialect_by_name, to_sql, to_sql_using, DuckDbDialect, SqlDialect};
use sqlparser::ast::{SetExpr, Statement};

fn scoring_pipeline() -> Operator {
    let d = TableDescription::new("d", ["subjectID", "surveyCategory", "assessmentTotal"]).unwrap();
    Operator::from(d)
        .extend([("probability", (col("assessmentTotal") * 0.237).exp())])
        .unwrap()
        .extend_window(
            [("total", col("probability").sum())],
            Window::new().partition_by(["subjectID"]),
        )
        .unwrap()
        .extend([("probability", col("probability") / col("total"))])
        .unwrap()
        .extend_window(
            [("row_number", row_number())],
            Window::new()
                .partition_by(["subjectID"])
                .order_by(["probability", "surveyCategory"])
                .reverse(["probability"]),
        )
        .unwrap()
        .select_rows(col("row_number").equals(1))
        .unwrap()
        .select_columns(["subjectID", "surveyCategory", "probability"])
        .unwrap()
        .rename_columns([("diagnosis", "surveyCategory")])
        .unwrap()
        .order_rows(RowOrder::by(["subjectID"]))
        .unwrap()
}

fn joined_pipeline() -> Operator {
    let w = TableDescription::new("w", ["subjectID", "weight", "note"]).unwrap();
    let right = Operator::from(w)
        .select_rows(col("weight").gt(lit(0)).and(!col("note").is_null()))
        .unwrap();
    scoring_pipeline()
        .natural_join(right, ["subjectID"], JoinType::Left)
        .unwrap()
        .project_grouped(
            [
                ("best", col("probability").max()),
                ("weight", col("weight").mean()),
            ],
            ["diagnosis"],
        )
        .unwrap()
}

/// Names of the outermost SELECT items
fn outer_columns(dialect: &dyn SqlDialect, sql: &str) -> Vec<String> {
    let statements = dialect.parse(sql).unwrap();
    let Statement::Query(query) = &statements[0] else {
        panic!("not a query: {sql}");
    };
    let SetExpr::Select(select) = query.body.as_ref() else {
        panic!("not a select: {sql}");
    };
    select
        .projection
        .iter()
        .map(|item| {
            let text = item.to_string();
            let name = text.rsplit(" AS ").next().unwrap_or(&text);
            name.trim_matches('"').to_string()
        })
        .collect()
}

#[test]
fn test_outer_select_is_exactly_the_request() {
    let dialect = DuckDbDialect::new();
    let ops = scoring_pipeline();
    let requests: Vec<ColumnSet> = vec![
        ["diagnosis"].iter().map(|s| s.to_string()).collect(),
        ["probability", "subjectID"].iter().map(|s| s.to_string()).collect(),
        ops.column_set(),
    ];
    for using in requests {
        let sql = to_sql_using(&ops, &dialect, &using).unwrap();
        let outer: ColumnSet = outer_columns(&dialect, &sql).into_iter().collect();
        assert_eq!(outer, using, "in {sql}");
    }
}

#[test]
fn test_generated_sql_parses_in_every_dialect() {
    for name in ["generic", "postgresql", "duckdb", "sqlite"] {
        let dialect = dialect_by_name(name).unwrap();
        for ops in [scoring_pipeline(), joined_pipeline()] {
            let sql = to_sql(&ops, dialect.as_ref()).unwrap();
            assert!(dialect.parse(&sql).is_ok(), "{name} rejected: {sql}");
        }
    }
}

#[test]
fn test_interchange_round_trip_preserves_sql() {
    let dialect = DuckDbDialect::new();
    for ops in [scoring_pipeline(), joined_pipeline()] {
        let sql = to_sql(&ops, &dialect).unwrap();

        let from_yaml_text = from_yaml(&to_yaml(&ops).unwrap()).unwrap();
        assert_eq!(from_yaml_text.column_names(), ops.column_names());
        assert_eq!(to_sql(&from_yaml_text, &dialect).unwrap(), sql);

        let from_json_text = from_json(&to_json(&ops).unwrap()).unwrap();
        assert_eq!(to_sql(&from_json_text, &dialect).unwrap(), sql);
    }
}
