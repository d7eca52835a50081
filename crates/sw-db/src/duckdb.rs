//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{ColumnInfo, Database};
use crate::value::Value;
use duckdb::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use sw_core::TableName;

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_with(sql, &[])
    }

    fn execute_with(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        let conn = self.lock()?;
        log::trace!("duckdb execute: {sql}");
        conn.execute(sql, duckdb::params_from_iter(params.iter()))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        log::trace!("duckdb execute_batch: {sql}");
        conn.execute_batch(sql).map_err(DbError::from)
    }

    fn query_rows(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Vec<Value>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        // Column metadata is only reliable after execution, so read the
        // column count from each row rather than the statement.
        let rows = stmt
            .query_map(duckdb::params_from_iter(params.iter()), |row| {
                let column_count = row.as_ref().column_count();
                (0..column_count)
                    .map(|i| row.get::<_, duckdb::types::Value>(i).map(Value::from))
                    .collect::<duckdb::Result<Vec<_>>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn relation_exists(&self, table: &TableName) -> DbResult<bool> {
        let rows = self.query_rows(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            &[table.schema().into(), table.table().into()],
        )?;
        let count = rows
            .first()
            .and_then(|row| row.first())
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(count > 0)
    }

    fn table_columns(&self, table: &TableName) -> DbResult<Vec<ColumnInfo>> {
        let rows = self.query_rows(
            "SELECT column_name, data_type, is_nullable, column_default \
             FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? \
             ORDER BY ordinal_position",
            &[table.schema().into(), table.table().into()],
        )?;

        rows.into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                let mut text = |column: &str| -> DbResult<Option<String>> {
                    match cells.next() {
                        Some(Value::Null) => Ok(None),
                        Some(Value::Text(s)) => Ok(Some(s)),
                        other => Err(DbError::Conversion {
                            table: "information_schema.columns".to_string(),
                            column: column.to_string(),
                            message: format!("expected text, got {other:?}"),
                        }),
                    }
                };
                let name = text("column_name")?.unwrap_or_default();
                let data_type = text("data_type")?.unwrap_or_default().to_ascii_uppercase();
                let nullable = text("is_nullable")?.is_some_and(|v| v.eq_ignore_ascii_case("YES"));
                let default = text("column_default")?;
                Ok(ColumnInfo {
                    name,
                    data_type,
                    nullable,
                    default,
                })
            })
            .collect()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
