//! Error types for sw-db

use thiserror::Error;

/// Data-access errors. Every variant is fatal to the migration step that
/// triggered it.
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// A column value could not be converted to the expected type (D004)
    #[error("[D004] Value conversion failed for {table}.{column}: {message}")]
    Conversion {
        table: String,
        column: String,
        message: String,
    },

    /// An update addressed a column the entity does not map (D005)
    #[error("[D005] Column '{column}' is not mapped on {table}")]
    UnknownColumn { table: String, column: String },

    /// An update matched no row (D006)
    #[error("[D006] No row in {table} with {key} = {value}")]
    RowNotFound {
        table: String,
        key: String,
        value: String,
    },

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants for catalog
        // errors, so classify by message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
