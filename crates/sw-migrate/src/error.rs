//! Error types for the migration engine.

use sw_core::{CoreError, SchemaVersion, StepName};
use sw_db::DbError;
use thiserror::Error;

/// Structural conflict raised by a schema-mutation primitive.
#[derive(Error, Debug)]
pub enum SchemaMutationError {
    /// MG001: Target table does not exist
    #[error("[MG001] Cannot add column '{column}': table {table} does not exist")]
    TableNotFound { table: String, column: String },

    /// MG002: Existing column is incompatible with the requested definition
    #[error("[MG002] Column {table}.{column} already exists as {existing}, which is incompatible with {requested}")]
    IncompatibleColumn {
        table: String,
        column: String,
        existing: String,
        requested: String,
    },

    /// MG003: Descriptor is malformed
    #[error("[MG003] Invalid column descriptor: {0}")]
    InvalidDescriptor(#[from] CoreError),

    /// Introspection of the live schema failed
    #[error(transparent)]
    DataAccess(#[from] DbError),
}

/// Root cause of a failed migration step.
#[derive(Error, Debug)]
pub enum StepFailure {
    #[error(transparent)]
    Schema(#[from] SchemaMutationError),

    #[error(transparent)]
    DataAccess(#[from] DbError),

    /// MG004: The step found data it cannot migrate
    #[error("[MG004] {0}")]
    InvalidData(String),
}

/// A step failed; carries the step identity and the last version that is
/// known to be fully applied.
#[derive(Error, Debug)]
#[error("[MG005] Migration step {version} '{name}' failed (database remains at {}): {source}", display_version(.last_completed))]
pub struct StepExecutionError {
    pub version: SchemaVersion,
    pub name: StepName,
    pub last_completed: Option<SchemaVersion>,
    #[source]
    pub source: StepFailure,
}

fn display_version(version: &Option<SchemaVersion>) -> String {
    version.map_or_else(|| "no version".to_string(), |v| v.to_string())
}

/// Run-level conflicts detected by the orchestrator.
#[derive(Error, Debug)]
pub enum OrchestratorStateError {
    /// MG006: Another run holds the migration lock
    #[error("[MG006] Another migration run for '{product}' is in progress (lock held by {holder} since {since})")]
    ConcurrentRun {
        product: String,
        holder: String,
        since: String,
    },

    /// MG007: The requested state transition is not allowed
    #[error("[MG007] Invalid orchestrator transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// MG008: The database is already past the requested version
    #[error("[MG008] Database for '{product}' is at {current}, which is newer than target {target}")]
    TargetBehindDatabase {
        product: String,
        current: SchemaVersion,
        target: SchemaVersion,
    },

    /// MG009: The declared plan is inconsistent
    #[error("[MG009] Invalid migration plan: {0}")]
    InvalidPlan(String),
}

/// Top-level error returned by a migration run.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error(transparent)]
    Step(#[from] StepExecutionError),

    #[error(transparent)]
    State(#[from] OrchestratorStateError),

    /// MG010: Reading or writing the migration record failed
    #[error("[MG010] Migration record store failed: {0}")]
    Record(#[source] DbError),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Result type alias for step bodies.
pub type StepResult<T> = Result<T, StepFailure>;
