use super::*;

fn sample() -> Table {
    Table::new(vec![
        Column::new("id", [Value::Int(1), Value::Int(2), Value::Null]),
        Column::new("score", [Value::Float(0.5), Value::Int(3), Value::Null]),
        Column::new("name", [Value::from("a"), Value::Null, Value::from("it's")]),
        Column::new("flag", [Value::Bool(true), Value::Bool(false), Value::Null]),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_in_memory() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert_eq!(db.db_type(), "duckdb");
}

#[tokio::test]
async fn test_execute_batch() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE t1 (id INT); CREATE TABLE t2 (id INT); INSERT INTO t1 VALUES (1);",
    )
    .await
    .unwrap();

    assert!(db.relation_exists("t1").await.unwrap());
    assert!(db.relation_exists("t2").await.unwrap());
}

#[tokio::test]
async fn test_relation_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(!db.relation_exists("nonexistent").await.unwrap());
}

#[tokio::test]
async fn test_query_table_types() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = db
        .query_table(
            "SELECT 1 AS i, CAST(2.5 AS DOUBLE) AS f, 'x' AS s, true AS b, \
             CAST(NULL AS INTEGER) AS n, SUM(v) AS total FROM (VALUES (1), (2)) t(v)",
        )
        .await
        .unwrap();
    assert_eq!(table.column_names(), vec!["i", "f", "s", "b", "n", "total"]);
    assert_eq!(
        table.row(0),
        vec![
            Value::Int(1),
            Value::Float(2.5),
            Value::from("x"),
            Value::Bool(true),
            Value::Null,
            Value::Int(3),
        ]
    );
}

#[tokio::test]
async fn test_decimal_reads_as_float() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = db.query_table("SELECT 0.25 AS d").await.unwrap();
    assert_eq!(table.values("d").unwrap(), &[Value::Float(0.25)]);
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let db = DuckDbBackend::in_memory().unwrap();
    let table = db
        .query_table("SELECT * FROM range(3) t(n) WHERE n > 10")
        .await
        .unwrap();
    assert_eq!(table.column_names(), vec!["n"]);
    assert_eq!(table.num_rows(), 0);
}

#[tokio::test]
async fn test_create_and_read_table() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_table_from("\"sample\"", &sample(), false)
        .await
        .unwrap();
    assert!(db.relation_exists("sample").await.unwrap());

    let back = db.read_table("\"sample\"").await.unwrap();
    assert!(back.equivalent(&sample(), 1e-12));
    assert_eq!(back.values("name").unwrap(), sample().values("name").unwrap());

    // replacing drops the old rows
    let smaller = sample().take(&[0]);
    db.create_table_from("\"sample\"", &smaller, true)
        .await
        .unwrap();
    assert_eq!(db.read_table("\"sample\"").await.unwrap().num_rows(), 1);
}

#[tokio::test]
async fn test_create_table_rejects_mixed_column() {
    let db = DuckDbBackend::in_memory().unwrap();
    let mixed = Table::new(vec![Column::new("m", [Value::Int(1), Value::from("one")])]).unwrap();
    assert!(matches!(
        db.create_table_from("\"mixed\"", &mixed, false).await,
        Err(DbError::UnsupportedValue { .. })
    ));
}

#[tokio::test]
async fn test_missing_table_is_classified() {
    let db = DuckDbBackend::in_memory().unwrap();
    assert!(matches!(
        db.read_table("\"nope\"").await,
        Err(DbError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_drop_if_exists() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_table_from("to_drop", &sample(), false)
        .await
        .unwrap();

    assert!(db.relation_exists("to_drop").await.unwrap());

    db.drop_if_exists("to_drop").await.unwrap();

    assert!(!db.relation_exists("to_drop").await.unwrap());
}

#[tokio::test]
async fn test_drop_if_exists_handles_views_and_missing_relations() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.create_table_from("base", &sample(), false)
        .await
        .unwrap();
    db.execute("CREATE VIEW flagged AS SELECT * FROM base WHERE flag")
        .await
        .unwrap();

    db.drop_if_exists("flagged").await.unwrap();
    assert!(!db.relation_exists("flagged").await.unwrap());
    assert!(db.relation_exists("base").await.unwrap());

    // nothing to drop is not an error
    db.drop_if_exists("flagged").await.unwrap();
}

#[tokio::test]
async fn test_drop_if_exists_reports_poisoned_connection() {
    let db = DuckDbBackend::in_memory().unwrap();
    std::thread::scope(|s| {
        let _ = s
            .spawn(|| {
                let _guard = db.conn.lock().unwrap();
                panic!("connection poisoned while held");
            })
            .join();
    });
    assert!(matches!(
        db.drop_if_exists("base").await,
        Err(DbError::MutexPoisoned(_))
    ));
}

#[tokio::test]
async fn test_create_schema_if_not_exists() {
    let db = DuckDbBackend::in_memory().unwrap();

    db.create_schema_if_not_exists("staging").await.unwrap();
    db.create_table_from("staging.scores", &sample(), false)
        .await
        .unwrap();
    assert!(db.relation_exists("staging.scores").await.unwrap());

    // Creating the same schema again should not fail (IF NOT EXISTS)
    db.create_schema_if_not_exists("staging").await.unwrap();
}
