use super::*;
use sw_db::{DuckDbBackend, Value};

fn db_with_groups() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE groups (id INTEGER NOT NULL, text VARCHAR NOT NULL);
         INSERT INTO groups VALUES (1, 'Content'), (2, 'Settings');",
    )
    .unwrap();
    db
}

fn groups() -> TableName {
    TableName::parse("groups").unwrap()
}

fn column_named(db: &DuckDbBackend, name: &str) -> Option<ColumnInfo> {
    db.table_columns(&groups())
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
}

fn index_count(db: &DuckDbBackend) -> i64 {
    db.query_rows(
        "SELECT COUNT(*) FROM duckdb_indexes() WHERE table_name = 'groups'",
        &[],
    )
    .unwrap()[0][0]
        .as_i64()
        .unwrap()
}

#[test]
fn immediate_add_with_default_and_not_null() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "type", ColumnType::Integer)
        .unwrap()
        .not_null()
        .default_value(ColumnDefault::Integer(0));

    let change = add_column(&db, &column, AddColumnMode::Immediate).unwrap();
    assert!(change.created);
    assert_eq!(change.applied.len(), 2);
    assert!(change.deferred.is_empty());

    let info = column_named(&db, "type").unwrap();
    assert_eq!(info.data_type, "INTEGER");
    assert!(!info.nullable);

    let rows = db
        .query_rows("SELECT \"type\" FROM groups ORDER BY id", &[])
        .unwrap();
    assert_eq!(rows, vec![vec![Value::Integer(0)], vec![Value::Integer(0)]]);
}

#[test]
fn add_twice_is_idempotent() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "type", ColumnType::Integer)
        .unwrap()
        .not_null()
        .default_value(ColumnDefault::Integer(0));

    add_column(&db, &column, AddColumnMode::Immediate).unwrap();
    let before = db.table_columns(&groups()).unwrap();

    let second = add_column(&db, &column, AddColumnMode::Immediate).unwrap();
    assert!(!second.created);
    assert!(second.is_noop());
    assert_eq!(db.table_columns(&groups()).unwrap(), before);
}

#[test]
fn unique_column_add_twice_keeps_one_index() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "code", ColumnType::Varchar)
        .unwrap()
        .unique();

    add_column(&db, &column, AddColumnMode::Immediate).unwrap();
    add_column(&db, &column, AddColumnMode::Immediate).unwrap();
    assert_eq!(index_count(&db), 1);
}

#[test]
fn deferred_creates_permissive_column_and_returns_constraints() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "alias", ColumnType::Varchar)
        .unwrap()
        .not_null()
        .unique();

    let change = add_column(&db, &column, AddColumnMode::Deferred).unwrap();
    assert!(change.created);
    assert_eq!(change.applied.len(), 1);
    assert_eq!(change.deferred.len(), 2);
    assert!(change.deferred[0].contains("SET NOT NULL"));
    assert!(change.deferred[1].starts_with("CREATE UNIQUE INDEX"));

    // Column exists but nothing is enforced yet.
    assert!(column_named(&db, "alias").unwrap().nullable);
    assert_eq!(index_count(&db), 0);

    db.execute("UPDATE groups SET alias = lower(text)").unwrap();
    for sql in &change.deferred {
        db.execute(sql).unwrap();
    }
    assert!(!column_named(&db, "alias").unwrap().nullable);
    assert_eq!(index_count(&db), 1);
}

#[test]
fn deferred_rerun_only_returns_missing_constraints() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "alias", ColumnType::Varchar)
        .unwrap()
        .not_null()
        .unique();

    // Interrupted earlier run: column created, constraints never applied.
    add_column(&db, &column, AddColumnMode::Deferred).unwrap();

    let rerun = add_column(&db, &column, AddColumnMode::Deferred).unwrap();
    assert!(!rerun.created);
    assert!(rerun.applied.is_empty());
    assert_eq!(rerun.deferred.len(), 2);
}

#[test]
fn immediate_not_null_without_default_fails_on_existing_rows() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "alias", ColumnType::Varchar)
        .unwrap()
        .not_null();
    let err = add_column(&db, &column, AddColumnMode::Immediate).unwrap_err();
    assert!(matches!(err, SchemaMutationError::DataAccess(_)), "got {err:?}");
}

#[test]
fn missing_table_is_reported() {
    let db = DuckDbBackend::in_memory().unwrap();
    let column = ColumnDescriptor::new(groups(), "alias", ColumnType::Varchar).unwrap();
    let err = add_column(&db, &column, AddColumnMode::Immediate).unwrap_err();
    assert!(matches!(err, SchemaMutationError::TableNotFound { .. }));
}

#[test]
fn type_mismatch_is_incompatible() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "text", ColumnType::Integer).unwrap();
    let err = add_column(&db, &column, AddColumnMode::Immediate).unwrap_err();
    assert!(matches!(err, SchemaMutationError::IncompatibleColumn { .. }));
}

#[test]
fn nullable_request_over_not_null_column_is_incompatible() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "text", ColumnType::Varchar).unwrap();
    let err = add_column(&db, &column, AddColumnMode::Immediate).unwrap_err();
    assert!(
        matches!(err, SchemaMutationError::IncompatibleColumn { ref existing, .. } if existing == "VARCHAR NOT NULL")
    );
}

#[test]
fn invalid_column_name_rejected() {
    let err = ColumnDescriptor::new(groups(), "bad name", ColumnType::Varchar).unwrap_err();
    assert!(matches!(err, SchemaMutationError::InvalidDescriptor(_)));
}

#[test]
fn text_default_is_quoted() {
    let db = db_with_groups();
    let column = ColumnDescriptor::new(groups(), "note", ColumnType::Varchar)
        .unwrap()
        .default_value(ColumnDefault::Text("it's".to_string()));
    let change = add_column(&db, &column, AddColumnMode::Immediate).unwrap();
    assert!(change.applied[0].ends_with("DEFAULT 'it''s'"));
    let rows = db.query_rows("SELECT DISTINCT note FROM groups", &[]).unwrap();
    assert_eq!(rows, vec![vec![Value::Text("it's".to_string())]]);
}

#[test]
fn scoped_unique_index_covers_scope_columns() {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch(
        "CREATE TABLE groups (id INTEGER NOT NULL, owner INTEGER NOT NULL, text VARCHAR NOT NULL);
         INSERT INTO groups VALUES (1, 10, 'Content'), (2, 11, 'Content');",
    )
    .unwrap();
    let column = ColumnDescriptor::new(groups(), "alias", ColumnType::Varchar)
        .unwrap()
        .not_null()
        .unique_within(&["owner"])
        .unwrap();
    assert_eq!(column.unique_scope(), ["owner".to_string()]);

    let change = add_column(&db, &column, AddColumnMode::Deferred).unwrap();
    assert!(change.deferred[1].ends_with("(\"owner\", \"alias\")"));

    db.execute("UPDATE groups SET alias = lower(text)").unwrap();
    for sql in &change.deferred {
        db.execute(sql).unwrap();
    }
    assert_eq!(index_count(&db), 1);

    // Same alias under another owner is fine, under the same owner it is not.
    db.execute("INSERT INTO groups VALUES (3, 12, 'Content', 'content')")
        .unwrap();
    assert!(db
        .execute("INSERT INTO groups VALUES (4, 10, 'Content', 'content')")
        .is_err());
}

#[test]
fn scoped_unique_rejects_invalid_scope_column() {
    let err = ColumnDescriptor::new(groups(), "alias", ColumnType::Varchar)
        .unwrap()
        .unique_within(&["bad column"])
        .unwrap_err();
    assert!(matches!(err, SchemaMutationError::InvalidDescriptor(_)));
}
