//! Per-step execution context.
//!
//! A [`MigrationContext`] is created by the orchestrator for exactly one step
//! execution. It carries the data-access handle, the diagnostics sink, and
//! the queue of statements deferred until the end of the step.

use crate::diagnostics::{Diagnostic, DiagnosticSink, Level};
use crate::error::StepResult;
use crate::schema::{add_column, AddColumnMode, ColumnChange, ColumnDescriptor};
use sw_core::{SchemaVersion, StepName};
use sw_db::{Criteria, Database, DbResult, Entity, EntityStore};

pub struct MigrationContext<'a> {
    db: &'a dyn Database,
    diagnostics: &'a dyn DiagnosticSink,
    version: SchemaVersion,
    step: StepName,
    pending: Vec<String>,
}

impl<'a> MigrationContext<'a> {
    pub fn new(
        db: &'a dyn Database,
        diagnostics: &'a dyn DiagnosticSink,
        version: SchemaVersion,
        step: StepName,
    ) -> Self {
        Self {
            db,
            diagnostics,
            version,
            step,
            pending: Vec::new(),
        }
    }

    pub fn database(&self) -> &'a dyn Database {
        self.db
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn step(&self) -> &StepName {
        &self.step
    }

    /// Add a column. In [`AddColumnMode::Deferred`] the returned constraint
    /// statements are also queued and run by [`flush`](Self::flush).
    pub fn add_column(
        &mut self,
        column: &ColumnDescriptor,
        mode: AddColumnMode,
    ) -> StepResult<ColumnChange> {
        let change = add_column(self.db, column, mode)?;
        self.pending.extend(change.deferred.iter().cloned());
        Ok(change)
    }

    /// Queue a raw statement for the end of the step.
    pub fn defer(&mut self, sql: impl Into<String>) {
        self.pending.push(sql.into());
    }

    /// Statements queued so far, in execution order.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn fetch<T: Entity>(&self, criteria: &Criteria) -> DbResult<Vec<T>> {
        self.db.fetch(criteria)
    }

    pub fn update<T: Entity>(&self, row: &T, fields: &[&str]) -> DbResult<()> {
        self.db.update(row, fields)
    }

    pub fn execute(&self, sql: &str) -> DbResult<usize> {
        self.db.execute(sql)
    }

    /// Start a diagnostic attributed to the current step.
    pub fn diagnostic(&self, level: Level, template: &'static str) -> Diagnostic {
        Diagnostic::new(level, self.step.as_str(), template)
    }

    /// Start a warning attributed to the current step.
    pub fn warn(&self, template: &'static str) -> Diagnostic {
        self.diagnostic(Level::Warning, template)
    }

    /// Hand a diagnostic to the sink.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.diagnostics.emit(diagnostic);
    }

    /// Execute every queued statement in order, draining the queue. On
    /// failure the statements not yet executed stay queued.
    pub fn flush(&mut self) -> DbResult<usize> {
        let mut executed = 0;
        while executed < self.pending.len() {
            if let Err(e) = self.db.execute(&self.pending[executed]) {
                self.pending.drain(..executed);
                return Err(e);
            }
            executed += 1;
        }
        self.pending.clear();
        Ok(executed)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
