use super::*;
use crate::expr::{col, lit, row_number};

fn d() -> Operator {
    Operator::from(TableDescription::new("d", ["subjectID", "category", "score"]).unwrap())
}

fn set(names: &[&str]) -> ColumnSet {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_table_description_key() {
    let plain = TableDescription::new("d", ["x"]).unwrap();
    assert_eq!(plain.key(), "d");

    let mut q = BTreeMap::new();
    q.insert("schema".to_string(), "main".to_string());
    q.insert("catalog".to_string(), "db".to_string());
    let qualified = TableDescription::with_qualifiers("d", ["x"], q).unwrap();
    assert_eq!(qualified.key(), "{(catalog, db)(schema, main)}.d");
    assert_ne!(plain, qualified);
    assert!(plain < qualified);
}

#[test]
fn test_table_description_rejects_bad_columns() {
    assert!(matches!(
        TableDescription::new("d", Vec::<String>::new()),
        Err(CoreError::EmptyColumnList { .. })
    ));
    assert!(matches!(
        TableDescription::new("d", ["x", "x"]),
        Err(CoreError::DuplicateColumn { .. })
    ));
    assert!(TableDescription::new("", ["x"]).is_err());
}

#[test]
fn test_extend_appends_new_columns_and_keeps_overwritten_position() {
    let ops = d()
        .extend([("score", col("score") * 2), ("z", lit(1))])
        .unwrap();
    assert_eq!(ops.column_names(), ["subjectID", "category", "score", "z"]);
}

#[test]
fn test_extend_validation() {
    assert!(matches!(
        d().extend(Vec::<(String, Expression)>::new()),
        Err(CoreError::NoOperations { .. })
    ));
    assert!(matches!(
        d().extend([("z", col("nope") + 1)]),
        Err(CoreError::UnknownColumns { .. })
    ));
    assert!(matches!(
        d().extend([("z", lit(1)), ("z", lit(2))]),
        Err(CoreError::DuplicateColumn { .. })
    ));
    assert!(matches!(
        d().extend_window(
            [("subjectID", row_number())],
            Window::new().partition_by(["subjectID"])
        ),
        Err(CoreError::AssignsWindowColumn { .. })
    ));
    assert!(matches!(
        d().extend_window(
            [("r", row_number())],
            Window::new().order_by(["score"]).reverse(["category"])
        ),
        Err(CoreError::ReverseNotInOrderBy { .. })
    ));
    assert!(matches!(
        d().extend_window(
            [("r", row_number())],
            Window::new().partition_by(["subjectID", "subjectID"])
        ),
        Err(CoreError::DuplicateColumn { .. })
    ));
    assert!(matches!(
        d().extend_window([("r", row_number())], Window::new().order_by(["missing"])),
        Err(CoreError::UnknownColumns { .. })
    ));
}

#[test]
fn test_extend_columns_used_drops_unrequested_ops() {
    let ops = d()
        .extend([("z", col("score") + 1), ("w", col("category"))])
        .unwrap();
    let used = ops
        .columns_used_from_sources(Some(&set(&["subjectID", "z"])))
        .unwrap();
    assert_eq!(used, vec![set(&["score", "subjectID"])]);
}

#[test]
fn test_extend_pass_through_when_no_op_retained() {
    let ops = d().extend([("z", col("score") + 1)]).unwrap();
    let used = ops
        .columns_used_from_sources(Some(&set(&["category"])))
        .unwrap();
    assert_eq!(used, vec![set(&["category"])]);
}

#[test]
fn test_extend_window_columns_are_required() {
    let ops = d()
        .extend_window(
            [("r", row_number())],
            Window::new()
                .partition_by(["subjectID"])
                .order_by(["score"]),
        )
        .unwrap();
    let used = ops.columns_used_from_sources(Some(&set(&["r"]))).unwrap();
    assert_eq!(used, vec![set(&["score", "subjectID"])]);
}

#[test]
fn test_overwriting_extend_needs_its_inputs() {
    let ops = d().extend([("score", col("score") * 2)]).unwrap();
    let used = ops.columns_used_from_sources(None).unwrap();
    assert_eq!(used, vec![set(&["category", "score", "subjectID"])]);
}

#[test]
fn test_columns_used_rejects_unknown_request() {
    let err = d()
        .columns_used_from_sources(Some(&set(&["nope"])))
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::UnknownColumns { ref context, ref columns }
            if context == "TableDescription" && columns == "['nope']"
    ));
}

#[test]
fn test_select_rows() {
    let ops = d().select_rows(col("score").gt(2)).unwrap();
    assert_eq!(ops.column_names(), d().column_names());
    let used = ops
        .columns_used_from_sources(Some(&set(&["category"])))
        .unwrap();
    assert_eq!(used, vec![set(&["category", "score"])]);
    assert!(d().select_rows(col("q").gt(2)).is_err());
}

#[test]
fn test_select_and_drop_columns() {
    let sel = d().select_columns(["score", "subjectID"]).unwrap();
    assert_eq!(sel.column_names(), ["score", "subjectID"]);
    assert!(d().select_columns(Vec::<String>::new()).is_err());
    assert!(d().select_columns(["score", "score"]).is_err());

    let dropped = d().drop_columns(["category"]).unwrap();
    assert_eq!(dropped.column_names(), ["subjectID", "score"]);
    assert!(matches!(
        d().drop_columns(["subjectID", "category", "score"]),
        Err(CoreError::EmptyColumnList { .. })
    ));
    assert!(d().drop_columns(["nope"]).is_err());
}

#[test]
fn test_project() {
    let ops = d()
        .project_grouped(
            [("total", col("score").sum()), ("n", col("category").count())],
            ["subjectID"],
        )
        .unwrap();
    assert_eq!(ops.column_names(), ["subjectID", "total", "n"]);
    let used = ops
        .columns_used_from_sources(Some(&set(&["total"])))
        .unwrap();
    assert_eq!(used, vec![set(&["score", "subjectID"])]);

    assert!(matches!(
        d().project_grouped([("subjectID", col("score").sum())], ["subjectID"]),
        Err(CoreError::DuplicateColumn { .. })
    ));
    assert!(matches!(
        d().project(Vec::<(String, Expression)>::new()),
        Err(CoreError::NoOperations { .. })
    ));
}

#[test]
fn test_order_rows() {
    let ops = d()
        .order_rows(RowOrder::by(["score"]).reverse(["score"]).limit(2))
        .unwrap();
    assert_eq!(ops.column_names(), d().column_names());
    let used = ops
        .columns_used_from_sources(Some(&set(&["category"])))
        .unwrap();
    assert_eq!(used, vec![set(&["category", "score"])]);
    assert!(matches!(
        d().order_rows(RowOrder::by(["score"]).reverse(["category"])),
        Err(CoreError::ReverseNotInOrderBy { .. })
    ));
}

#[test]
fn test_rename_columns() {
    let ops = d().rename_columns([("id", "subjectID")]).unwrap();
    assert_eq!(ops.column_names(), ["id", "category", "score"]);
    let used = ops
        .columns_used_from_sources(Some(&set(&["id", "score"])))
        .unwrap();
    assert_eq!(used, vec![set(&["score", "subjectID"])]);

    // swapping names is allowed
    let swapped = d()
        .rename_columns([("score", "category"), ("category", "score")])
        .unwrap();
    assert_eq!(swapped.column_names(), ["subjectID", "score", "category"]);

    assert!(matches!(
        d().rename_columns([("score", "category")]),
        Err(CoreError::RenameCollision { .. })
    ));
    assert!(d().rename_columns([("a", "nope")]).is_err());
    assert!(d()
        .rename_columns([("a", "score"), ("b", "score")])
        .is_err());
}

#[test]
fn test_natural_join_columns() {
    let right = Operator::from(TableDescription::new("r", ["subjectID", "score", "weight"]).unwrap());
    let ops = d()
        .natural_join(right, ["subjectID"], JoinType::Left)
        .unwrap();
    assert_eq!(
        ops.column_names(),
        ["subjectID", "category", "score", "weight"]
    );
    let used = ops
        .columns_used_from_sources(Some(&set(&["weight"])))
        .unwrap();
    assert_eq!(used, vec![set(&["subjectID"]), set(&["subjectID", "weight"])]);
}

#[test]
fn test_natural_join_key_checks() {
    let right = || Operator::from(TableDescription::new("r", ["k", "v"]).unwrap());
    assert!(matches!(
        d().natural_join(right(), ["k"], JoinType::Inner),
        Err(CoreError::JoinKeyMissing { ref side, .. }) if side == "left"
    ));
    assert!(matches!(
        d().natural_join(right(), ["subjectID"], JoinType::Inner),
        Err(CoreError::JoinKeyMissing { ref side, .. }) if side == "right"
    ));
    assert!(matches!(
        d().natural_join(right(), Vec::<String>::new(), JoinType::Inner),
        Err(CoreError::EmptyColumnList { .. })
    ));
}

#[test]
fn test_join_type_names() {
    assert_eq!(JoinType::Full.to_string(), "FULL");
    assert_eq!("left".parse::<JoinType>().unwrap(), JoinType::Left);
    assert!("cross".parse::<JoinType>().is_err());
}

#[test]
fn test_tables_collects_and_checks_conflicts() {
    let right = Operator::from(TableDescription::new("r", ["subjectID", "w"]).unwrap());
    let ops = d()
        .natural_join(right, ["subjectID"], JoinType::Inner)
        .unwrap()
        .natural_join(d(), ["subjectID"], JoinType::Inner)
        .unwrap();
    let tables = ops.tables().unwrap();
    assert_eq!(tables.keys().collect::<Vec<_>>(), ["d", "r"]);

    let conflicting = Operator::from(TableDescription::new("d", ["subjectID", "other"]).unwrap());
    let bad = d()
        .natural_join(conflicting, ["subjectID"], JoinType::Inner)
        .unwrap();
    assert!(matches!(
        bad.tables(),
        Err(CoreError::ConflictingTable { .. })
    ));
}

#[test]
fn test_parse_against_node_columns() {
    let ops = d().extend([("z", lit(1))]).unwrap();
    let e = ops.parse("z + score", &ExprContext::new()).unwrap();
    assert_eq!(e, col("z") + col("score"));
    assert!(d().parse("z + score", &ExprContext::new()).is_err());
}

#[test]
fn test_operator_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Operator>();
}
