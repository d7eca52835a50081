//! Persistent migration record.
//!
//! Three tables under the `sw_meta` schema track progress:
//!
//! - `schema_version`: one row per product holding its current version
//! - `migration_log`: append-only outcome of every step execution
//! - `migration_lock`: at most one row per product while a run is active
//!
//! `schema_version` and `migration_log` carry no indexes so DuckDB never
//! blocks an in-transaction update of a row it just wrote. Lock rows are
//! only inserted and deleted, so `migration_lock` has a unique index on
//! `product`: a second connection racing past the existence check fails
//! its insert instead of sharing the lock.

use serde::Serialize;
use std::collections::HashSet;
use sw_core::{ProductName, SchemaVersion, StepName};
use sw_db::{Database, DbError, DbResult, Value};

const RECORD_DDL: &str = "CREATE SCHEMA IF NOT EXISTS sw_meta;
CREATE TABLE IF NOT EXISTS sw_meta.schema_version (
    product    VARCHAR NOT NULL,
    version    VARCHAR NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS sw_meta.migration_log (
    product   VARCHAR NOT NULL,
    version   VARCHAR NOT NULL,
    sequence  INTEGER NOT NULL,
    step      VARCHAR NOT NULL,
    succeeded BOOLEAN NOT NULL,
    detail    VARCHAR,
    logged_at TIMESTAMP NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS sw_meta.migration_lock (
    product     VARCHAR NOT NULL,
    holder      VARCHAR NOT NULL,
    acquired_at TIMESTAMP NOT NULL DEFAULT now()
);
CREATE UNIQUE INDEX IF NOT EXISTS ux_migration_lock_product
    ON sw_meta.migration_lock (product);";

/// Current holder of a product's migration lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockInfo {
    pub holder: String,
    pub acquired_at: String,
}

/// Result of [`RecordStore::acquire_lock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAttempt {
    Acquired,
    Held(LockInfo),
}

/// One row of `sw_meta.migration_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub version: SchemaVersion,
    pub sequence: u32,
    pub step: String,
    pub succeeded: bool,
    pub detail: Option<String>,
    pub logged_at: String,
}

/// Reads and writes the migration record through the data-access contract.
pub struct RecordStore<'a> {
    db: &'a dyn Database,
}

impl<'a> RecordStore<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Create the `sw_meta` schema and its tables if missing.
    pub fn ensure(&self) -> DbResult<()> {
        self.db.execute_batch(RECORD_DDL)
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back
    /// on error.
    pub fn transaction<F, T>(&self, body: F) -> DbResult<T>
    where
        F: FnOnce(&Self) -> DbResult<T>,
    {
        self.db
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::ExecutionError(format!("BEGIN failed: {e}")))?;

        let result = body(self);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.db.execute_batch("COMMIT") {
                    let _ = self.db.execute_batch("ROLLBACK");
                    return Err(DbError::ExecutionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => {
                let _ = self.db.execute_batch("ROLLBACK");
            }
        }
        result
    }

    /// Recorded version of `product`, or `None` before its first commit.
    pub fn current_version(&self, product: &ProductName) -> DbResult<Option<SchemaVersion>> {
        let rows = self.db.query_rows(
            "SELECT version FROM sw_meta.schema_version WHERE product = ?",
            &[product.as_str().into()],
        )?;
        match rows.into_iter().next().and_then(|r| r.into_iter().next()) {
            Some(cell) => parse_version("schema_version", cell).map(Some),
            None => Ok(None),
        }
    }

    /// Set `product` to `version`, inserting the row on first use.
    pub fn set_version(&self, product: &ProductName, version: SchemaVersion) -> DbResult<()> {
        let params: [Value; 2] = [version.to_string().into(), product.as_str().into()];
        let updated = self.db.execute_with(
            "UPDATE sw_meta.schema_version SET version = ?, updated_at = now() WHERE product = ?",
            &params,
        )?;
        if updated == 0 {
            self.db.execute_with(
                "INSERT INTO sw_meta.schema_version (version, product) VALUES (?, ?)",
                &params,
            )?;
        }
        Ok(())
    }

    /// Append a step outcome to the log.
    pub fn log_step(
        &self,
        product: &ProductName,
        version: SchemaVersion,
        sequence: u32,
        step: &StepName,
        succeeded: bool,
        detail: Option<&str>,
    ) -> DbResult<()> {
        self.db.execute_with(
            "INSERT INTO sw_meta.migration_log (product, version, sequence, step, succeeded, detail) \
             VALUES (?, ?, ?, ?, ?, ?)",
            &[
                product.as_str().into(),
                version.to_string().into(),
                sequence.into(),
                step.as_str().into(),
                succeeded.into(),
                detail.into(),
            ],
        )?;
        Ok(())
    }

    /// `(version, step name)` of every logged success for `product`.
    pub fn succeeded_steps(&self, product: &ProductName) -> DbResult<HashSet<(SchemaVersion, String)>> {
        let rows = self.db.query_rows(
            "SELECT version, step FROM sw_meta.migration_log WHERE product = ? AND succeeded",
            &[product.as_str().into()],
        )?;
        let mut done = HashSet::with_capacity(rows.len());
        for row in rows {
            let mut cells = row.into_iter();
            let version = parse_version("migration_log", cells.next().unwrap_or(Value::Null))?;
            let step = cells
                .next()
                .and_then(Value::into_text)
                .ok_or_else(|| conversion("migration_log", "step", "expected text"))?;
            done.insert((version, step));
        }
        Ok(done)
    }

    /// Full log for `product`, oldest first.
    pub fn history(&self, product: &ProductName) -> DbResult<Vec<LogEntry>> {
        let rows = self.db.query_rows(
            "SELECT version, sequence, step, succeeded, detail, CAST(logged_at AS VARCHAR) \
             FROM sw_meta.migration_log WHERE product = ? ORDER BY logged_at, version, sequence",
            &[product.as_str().into()],
        )?;
        rows.into_iter().map(log_entry).collect()
    }

    /// Take the product lock unless someone else holds it.
    pub fn acquire_lock(&self, product: &ProductName, holder: &str) -> DbResult<LockAttempt> {
        self.transaction(|store| {
            if let Some(existing) = store.lock_holder(product)? {
                return Ok(LockAttempt::Held(existing));
            }
            store.db.execute_with(
                "INSERT INTO sw_meta.migration_lock (product, holder) VALUES (?, ?)",
                &[product.as_str().into(), holder.into()],
            )?;
            Ok(LockAttempt::Acquired)
        })
    }

    /// Current lock holder of `product`, if any.
    pub fn lock_holder(&self, product: &ProductName) -> DbResult<Option<LockInfo>> {
        let rows = self.db.query_rows(
            "SELECT holder, CAST(acquired_at AS VARCHAR) FROM sw_meta.migration_lock WHERE product = ?",
            &[product.as_str().into()],
        )?;
        Ok(rows.into_iter().next().map(|row| {
            let mut cells = row.into_iter().map(|v| v.into_text().unwrap_or_default());
            LockInfo {
                holder: cells.next().unwrap_or_default(),
                acquired_at: cells.next().unwrap_or_default(),
            }
        }))
    }

    /// Drop the product lock regardless of holder. Returns whether a lock
    /// was present.
    pub fn release_lock(&self, product: &ProductName) -> DbResult<bool> {
        let removed = self.db.execute_with(
            "DELETE FROM sw_meta.migration_lock WHERE product = ?",
            &[product.as_str().into()],
        )?;
        Ok(removed > 0)
    }
}

fn conversion(table: &str, column: &str, message: &str) -> DbError {
    DbError::Conversion {
        table: format!("sw_meta.{table}"),
        column: column.to_string(),
        message: message.to_string(),
    }
}

fn parse_version(table: &str, cell: Value) -> DbResult<SchemaVersion> {
    let text = cell
        .into_text()
        .ok_or_else(|| conversion(table, "version", "expected text"))?;
    SchemaVersion::parse(&text).map_err(|e| conversion(table, "version", &e.to_string()))
}

fn log_entry(row: Vec<Value>) -> DbResult<LogEntry> {
    let mut cells = row.into_iter();
    let version = parse_version("migration_log", cells.next().unwrap_or(Value::Null))?;
    let sequence = cells
        .next()
        .and_then(|v| v.as_i64())
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| conversion("migration_log", "sequence", "expected a non-negative integer"))?;
    let step = cells.next().and_then(Value::into_text).unwrap_or_default();
    let succeeded = cells.next().and_then(|v| v.as_bool()).unwrap_or(false);
    let detail = cells.next().and_then(Value::into_text);
    let logged_at = cells.next().and_then(Value::into_text).unwrap_or_default();
    Ok(LogEntry {
        version,
        sequence,
        step,
        succeeded,
        detail,
        logged_at,
    })
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
