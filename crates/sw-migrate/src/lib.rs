//! sw-migrate - Migration engine for Stepwise
//!
//! This crate moves a live database from its recorded schema version to a
//! target version one step at a time. It provides:
//!
//! - idempotent schema primitives ([`schema::add_column`])
//! - collision-safe alias derivation for existing rows ([`alias`])
//! - the step model and the steps Stepwise ships ([`step`], [`steps`])
//! - the per-step [`MigrationContext`] and the [`Orchestrator`] that
//!   records progress in `sw_meta`

pub mod alias;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod record;
pub mod schema;
pub mod step;
pub mod steps;

pub use alias::{plan_aliases, AliasProjection, SafeAlias};
pub use context::MigrationContext;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Level, LogSink};
pub use error::{
    MigrateError, MigrateResult, OrchestratorStateError, SchemaMutationError, StepExecutionError,
    StepFailure,
};
pub use orchestrator::{MigrationOutcome, Orchestrator, OrchestratorState};
pub use plan::MigrationPlan;
pub use record::RecordStore;
pub use schema::{add_column, AddColumnMode, ColumnDescriptor, ColumnType};
pub use step::{MigrationStep, StepKind};
