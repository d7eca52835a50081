//! Database trait definition

use crate::error::DbResult;
use crate::value::Value;
use sw_core::TableName;

/// Column metadata as reported by the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name as stored in the catalog
    pub name: String,
    /// Upper-case type name (e.g. `VARCHAR`, `INTEGER`)
    pub data_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Default expression, if any
    pub default: Option<String>,
}

/// Data-access contract consumed by the migration engine.
///
/// Migrations run on a single thread during startup, so implementations are
/// not required to be `Send` or `Sync`.
pub trait Database {
    /// Execute a single statement, returning the number of affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a single parameterised statement (`?` placeholders)
    fn execute_with(&self, sql: &str, params: &[Value]) -> DbResult<usize>;

    /// Execute one or more `;`-separated statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and collect every row
    fn query_rows(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Vec<Value>>>;

    /// Check if a table or view exists
    fn relation_exists(&self, table: &TableName) -> DbResult<bool>;

    /// Describe the columns of a table, in ordinal order
    fn table_columns(&self, table: &TableName) -> DbResult<Vec<ColumnInfo>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
