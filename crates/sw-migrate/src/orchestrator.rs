//! Migration orchestrator.
//!
//! Resolves the steps between the recorded version and the target, runs
//! them in `(version, sequence)` order, and records progress after every
//! step so an interrupted run resumes where it stopped.
//!
//! States: `Idle -> Resolving -> Executing* -> Committing -> Done`, with
//! `Failed` reachable from any active state. A run may start from `Idle`,
//! `Done` or `Failed`.

use crate::context::MigrationContext;
use crate::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Level};
use crate::error::{
    MigrateError, MigrateResult, OrchestratorStateError, StepExecutionError, StepFailure,
};
use crate::plan::MigrationPlan;
use crate::record::{LockAttempt, RecordStore};
use crate::step::MigrationStep;
use serde::Serialize;
use std::fmt;
use sw_core::{ProductName, SchemaVersion, StepName};
use sw_db::Database;

const FAILURE_TEMPLATE: &str = "Migration step {Version} {Step} failed: {Error}";

/// Lifecycle of an [`Orchestrator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorState {
    Idle,
    Resolving,
    Executing {
        version: SchemaVersion,
        step: StepName,
    },
    Committing,
    Done {
        version: Option<SchemaVersion>,
    },
    Failed {
        last_completed: Option<SchemaVersion>,
    },
}

impl OrchestratorState {
    pub fn name(&self) -> &'static str {
        match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Resolving => "resolving",
            OrchestratorState::Executing { .. } => "executing",
            OrchestratorState::Committing => "committing",
            OrchestratorState::Done { .. } => "done",
            OrchestratorState::Failed { .. } => "failed",
        }
    }

    /// Whether a run may move from `self` to `next`.
    pub fn can_transition_to(&self, next: &OrchestratorState) -> bool {
        use OrchestratorState::*;
        matches!(
            (self, next),
            (Idle | Done { .. } | Failed { .. }, Resolving)
                | (Resolving, Executing { .. } | Committing | Done { .. } | Failed { .. })
                | (Executing { .. }, Executing { .. } | Committing | Failed { .. })
                | (Committing, Done { .. } | Failed { .. })
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestratorState::Executing { version, step } => write!(f, "executing {version} '{step}'"),
            OrchestratorState::Done { version: Some(v) } => write!(f, "done at {v}"),
            OrchestratorState::Failed {
                last_completed: Some(v),
            } => write!(f, "failed after {v}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Step reference in a [`MigrationOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub version: SchemaVersion,
    pub sequence: u32,
    pub name: StepName,
}

impl From<&MigrationStep> for StepSummary {
    fn from(step: &MigrationStep) -> Self {
        Self {
            version: step.version(),
            sequence: step.sequence(),
            name: step.name().clone(),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub product: ProductName,
    pub from: Option<SchemaVersion>,
    pub to: SchemaVersion,
    /// Steps executed by this run
    pub applied: Vec<StepSummary>,
    /// Steps found already succeeded in the log and not re-run
    pub skipped: Vec<StepSummary>,
    pub warnings: usize,
}

impl MigrationOutcome {
    /// Nothing had to be done.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.from == Some(self.to)
    }
}

/// Runs a [`MigrationPlan`] against one database.
pub struct Orchestrator<'a> {
    db: &'a dyn Database,
    diagnostics: &'a dyn DiagnosticSink,
    plan: MigrationPlan,
    holder: String,
    state: OrchestratorState,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        db: &'a dyn Database,
        diagnostics: &'a dyn DiagnosticSink,
        plan: MigrationPlan,
        holder: impl Into<String>,
    ) -> Self {
        Self {
            db,
            diagnostics,
            plan,
            holder: holder.into(),
            state: OrchestratorState::Idle,
        }
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn plan(&self) -> &MigrationPlan {
        &self.plan
    }

    fn product(&self) -> &ProductName {
        self.plan.product()
    }

    fn records(&self) -> RecordStore<'a> {
        RecordStore::new(self.db)
    }

    fn advance(&mut self, next: OrchestratorState) -> Result<(), OrchestratorStateError> {
        if !self.state.can_transition_to(&next) {
            return Err(OrchestratorStateError::InvalidTransition {
                from: self.state.to_string(),
                to: next.name().to_string(),
            });
        }
        log::trace!("Orchestrator {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Recorded version of the plan's product.
    pub fn current_version(&self) -> MigrateResult<Option<SchemaVersion>> {
        let records = self.records();
        records.ensure().map_err(MigrateError::Record)?;
        records
            .current_version(self.product())
            .map_err(MigrateError::Record)
    }

    /// Migrate to `target`, or to the plan's latest version when `None`.
    ///
    /// Holds the product lock for the duration of the run and releases it
    /// whether the run succeeds or fails.
    pub fn run(&mut self, target: Option<SchemaVersion>) -> MigrateResult<MigrationOutcome> {
        if !self.state.can_transition_to(&OrchestratorState::Resolving) {
            return Err(OrchestratorStateError::InvalidTransition {
                from: self.state.to_string(),
                to: OrchestratorState::Resolving.name().to_string(),
            }
            .into());
        }

        let records = self.records();
        records.ensure().map_err(MigrateError::Record)?;
        match records
            .acquire_lock(self.product(), &self.holder)
            .map_err(MigrateError::Record)?
        {
            LockAttempt::Acquired => {
                log::debug!("Acquired migration lock for '{}' as {}", self.product(), self.holder)
            }
            LockAttempt::Held(info) => {
                return Err(OrchestratorStateError::ConcurrentRun {
                    product: self.product().to_string(),
                    holder: info.holder,
                    since: info.acquired_at,
                }
                .into());
            }
        }

        let result = self.run_locked(target);

        match records.release_lock(self.product()) {
            Ok(_) => log::debug!("Released migration lock for '{}'", self.product()),
            Err(e) => {
                log::warn!("Failed to release migration lock for '{}': {}", self.product(), e);
                if result.is_ok() {
                    return Err(MigrateError::Record(e));
                }
            }
        }
        result
    }

    fn run_locked(&mut self, target: Option<SchemaVersion>) -> MigrateResult<MigrationOutcome> {
        self.advance(OrchestratorState::Resolving)?;
        let records = self.records();

        let current = match records.current_version(self.product()) {
            Ok(v) => v,
            Err(e) => return Err(self.fail(None, MigrateError::Record(e))),
        };

        let target = match target.or_else(|| self.plan.latest_version()).or(current) {
            Some(t) => t,
            None => {
                let err = OrchestratorStateError::InvalidPlan(format!(
                    "no steps are declared for '{}' and no target version was given",
                    self.product()
                ));
                return Err(self.fail(current, err.into()));
            }
        };

        if let Some(current) = current {
            if current > target {
                let err = OrchestratorStateError::TargetBehindDatabase {
                    product: self.product().to_string(),
                    current,
                    target,
                };
                return Err(self.fail(Some(current), err.into()));
            }
            if current == target {
                log::info!("'{}' is already at {}", self.product(), current);
                self.advance(OrchestratorState::Done {
                    version: Some(current),
                })?;
                return Ok(MigrationOutcome {
                    product: self.product().clone(),
                    from: Some(current),
                    to: current,
                    applied: Vec::new(),
                    skipped: Vec::new(),
                    warnings: 0,
                });
            }
        }

        let done = match records.succeeded_steps(self.product()) {
            Ok(done) => done,
            Err(e) => return Err(self.fail(current, MigrateError::Record(e))),
        };

        let pending: Vec<MigrationStep> = self
            .plan
            .pending(current, target)
            .into_iter()
            .cloned()
            .collect();
        log::debug!(
            "Resolved {} step(s) for '{}' from {} to {}",
            pending.len(),
            self.product(),
            current.map_or_else(|| "nothing".to_string(), |v| v.to_string()),
            target
        );

        let collector = CollectingSink::forwarding_to(self.diagnostics);
        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let mut last_completed = current;

        for (i, step) in pending.iter().enumerate() {
            let closes_version = pending
                .get(i + 1)
                .map_or(true, |next| next.version() != step.version());

            if done.contains(&(step.version(), step.name().to_string())) {
                log::debug!("Skipping {step}: already applied");
                skipped.push(StepSummary::from(step));
                if closes_version {
                    if let Err(e) = records.set_version(self.product(), step.version()) {
                        return Err(self.fail(last_completed, MigrateError::Record(e)));
                    }
                    last_completed = Some(step.version());
                }
                continue;
            }

            self.advance(OrchestratorState::Executing {
                version: step.version(),
                step: step.name().clone(),
            })?;
            log::debug!("Applying {step}");

            if let Err(err) = self.execute_step(step, &collector) {
                return Err(self.step_failed(step, last_completed, err, &collector));
            }

            let recorded = records.transaction(|r| {
                r.log_step(
                    self.product(),
                    step.version(),
                    step.sequence(),
                    step.name(),
                    true,
                    None,
                )?;
                if closes_version {
                    r.set_version(self.product(), step.version())?;
                }
                Ok(())
            });
            if let Err(e) = recorded {
                return Err(self.fail(last_completed, MigrateError::Record(e)));
            }
            if closes_version {
                last_completed = Some(step.version());
            }
            applied.push(StepSummary::from(step));
        }

        self.advance(OrchestratorState::Committing)?;
        if let Err(e) = records.set_version(self.product(), target) {
            return Err(self.fail(last_completed, MigrateError::Record(e)));
        }
        self.advance(OrchestratorState::Done {
            version: Some(target),
        })?;
        log::info!(
            "Migrated '{}' to {} ({} step(s) applied, {} skipped)",
            self.product(),
            target,
            applied.len(),
            skipped.len()
        );

        Ok(MigrationOutcome {
            product: self.product().clone(),
            from: current,
            to: target,
            applied,
            skipped,
            warnings: collector.count(Level::Warning),
        })
    }

    fn execute_step(&self, step: &MigrationStep, sink: &dyn DiagnosticSink) -> Result<(), StepFailure> {
        let mut ctx = MigrationContext::new(self.db, sink, step.version(), step.name().clone());
        step.migrate(&mut ctx)?;
        let flushed = ctx.flush()?;
        if flushed > 0 {
            log::debug!("Flushed {flushed} deferred statement(s) for {step}");
        }
        Ok(())
    }

    fn step_failed(
        &mut self,
        step: &MigrationStep,
        last_completed: Option<SchemaVersion>,
        source: StepFailure,
        sink: &dyn DiagnosticSink,
    ) -> MigrateError {
        let detail = source.to_string();
        if let Err(e) = self.records().log_step(
            self.product(),
            step.version(),
            step.sequence(),
            step.name(),
            false,
            Some(&detail),
        ) {
            log::warn!("Could not log failure of {step}: {e}");
        }

        sink.emit(
            Diagnostic::new(Level::Error, step.name().as_str(), FAILURE_TEMPLATE)
                .with("Version", step.version().to_string())
                .with("Step", step.name().as_str())
                .with("Error", detail),
        );

        let err = StepExecutionError {
            version: step.version(),
            name: step.name().clone(),
            last_completed,
            source,
        };
        self.fail(last_completed, err.into())
    }

    fn fail(&mut self, last_completed: Option<SchemaVersion>, err: MigrateError) -> MigrateError {
        self.state = OrchestratorState::Failed { last_completed };
        err
    }

    /// Clear a lock left behind by a crashed run. Returns whether a lock was
    /// present.
    pub fn release_lock(&self) -> MigrateResult<bool> {
        let records = self.records();
        records.ensure().map_err(MigrateError::Record)?;
        let released = records
            .release_lock(self.product())
            .map_err(MigrateError::Record)?;
        if released {
            log::info!("Released migration lock for '{}'", self.product());
        }
        Ok(released)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
