use super::*;
use crate::diagnostics::CollectingSink;
use crate::schema::ColumnType;
use sw_core::TableName;
use sw_db::{DuckDbBackend, Value};

fn context<'a>(db: &'a DuckDbBackend, sink: &'a CollectingSink<'a>) -> MigrationContext<'a> {
    MigrationContext::new(
        db,
        sink,
        SchemaVersion::new(1, 1, 0),
        StepName::new("test_step").unwrap(),
    )
}

fn seeded() -> DuckDbBackend {
    let db = DuckDbBackend::in_memory().unwrap();
    db.execute_batch("CREATE TABLE items (id INTEGER NOT NULL, label VARCHAR)")
        .unwrap();
    db
}

#[test]
fn deferred_column_statements_are_queued() {
    let db = seeded();
    let sink = CollectingSink::new();
    let mut ctx = context(&db, &sink);

    let column = ColumnDescriptor::new(TableName::parse("items").unwrap(), "code", ColumnType::Varchar)
        .unwrap()
        .not_null()
        .unique();
    let change = ctx.add_column(&column, AddColumnMode::Deferred).unwrap();
    assert_eq!(ctx.pending(), change.deferred.as_slice());

    // Empty table: constraints apply cleanly.
    assert_eq!(ctx.flush().unwrap(), 2);
    assert!(ctx.pending().is_empty());
}

#[test]
fn immediate_column_queues_nothing() {
    let db = seeded();
    let sink = CollectingSink::new();
    let mut ctx = context(&db, &sink);
    let column = ColumnDescriptor::new(TableName::parse("items").unwrap(), "flag", ColumnType::Boolean)
        .unwrap();
    ctx.add_column(&column, AddColumnMode::Immediate).unwrap();
    assert!(ctx.pending().is_empty());
}

#[test]
fn flush_runs_in_order() {
    let db = seeded();
    let sink = CollectingSink::new();
    let mut ctx = context(&db, &sink);
    ctx.defer("INSERT INTO items VALUES (1, 'a')");
    ctx.defer("UPDATE items SET label = label || 'b'");
    ctx.defer("UPDATE items SET label = label || 'c'");
    assert_eq!(ctx.flush().unwrap(), 3);

    let rows = db.query_rows("SELECT label FROM items", &[]).unwrap();
    assert_eq!(rows, vec![vec![Value::Text("abc".to_string())]]);
}

#[test]
fn flush_failure_keeps_unexecuted_statements() {
    let db = seeded();
    let sink = CollectingSink::new();
    let mut ctx = context(&db, &sink);
    ctx.defer("INSERT INTO items VALUES (1, 'a')");
    ctx.defer("INSERT INTO missing VALUES (1)");
    ctx.defer("INSERT INTO items VALUES (2, 'b')");

    assert!(ctx.flush().is_err());
    assert_eq!(
        ctx.pending(),
        [
            "INSERT INTO missing VALUES (1)".to_string(),
            "INSERT INTO items VALUES (2, 'b')".to_string()
        ]
    );
}

#[test]
fn diagnostics_are_attributed_to_the_step() {
    let db = seeded();
    let sink = CollectingSink::new();
    let ctx = context(&db, &sink);
    ctx.emit(
        ctx.warn("Alias {Alias} reused")
            .with("Alias", "content"),
    );

    let emitted = sink.diagnostics();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].level, Level::Warning);
    assert_eq!(emitted[0].source, "test_step");
    assert_eq!(emitted[0].render(), "Alias content reused");
}

#[test]
fn exposes_step_identity() {
    let db = seeded();
    let sink = CollectingSink::new();
    let ctx = context(&db, &sink);
    assert_eq!(ctx.version(), SchemaVersion::new(1, 1, 0));
    assert_eq!(ctx.step(), &StepName::new("test_step").unwrap());
    assert_eq!(ctx.database().db_type(), "duckdb");
}
