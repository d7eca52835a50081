//! Migration steps.
//!
//! A [`MigrationStep`] binds one behavior ([`StepKind`]) to its position in
//! the upgrade path: the target [`SchemaVersion`], a sequence number within
//! that version, and a stable name. Building a step never touches the
//! database; all work happens in [`MigrationStep::migrate`].

use crate::context::MigrationContext;
use crate::error::StepResult;
use crate::steps::property_group;
use serde::Serialize;
use std::fmt;
use sw_core::{CoreResult, SchemaVersion, StepName};

/// Ordering key of a step within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StepKey {
    pub version: SchemaVersion,
    pub sequence: u32,
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.version, self.sequence)
    }
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Run a batch of raw statements
    Sql(String),
    /// Add `type` and `alias` to the property group table and backfill
    /// `alias` from each group's display text
    AddPropertyGroupColumns,
}

impl StepKind {
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Sql(_) => "sql",
            StepKind::AddPropertyGroupColumns => "add-property-group-columns",
        }
    }
}

/// One versioned unit of schema or data change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    key: StepKey,
    name: StepName,
    kind: StepKind,
}

impl MigrationStep {
    pub fn new(version: SchemaVersion, sequence: u32, name: &str, kind: StepKind) -> CoreResult<Self> {
        Ok(Self {
            key: StepKey { version, sequence },
            name: StepName::new(name)?,
            kind,
        })
    }

    /// Raw-SQL step.
    pub fn sql(
        version: SchemaVersion,
        sequence: u32,
        name: &str,
        sql: impl Into<String>,
    ) -> CoreResult<Self> {
        Self::new(version, sequence, name, StepKind::Sql(sql.into()))
    }

    /// Property group `type`/`alias` step under its canonical name.
    pub fn add_property_group_columns(version: SchemaVersion, sequence: u32) -> CoreResult<Self> {
        Self::new(
            version,
            sequence,
            property_group::STEP_NAME,
            StepKind::AddPropertyGroupColumns,
        )
    }

    pub fn key(&self) -> StepKey {
        self.key
    }

    pub fn version(&self) -> SchemaVersion {
        self.key.version
    }

    pub fn sequence(&self) -> u32 {
        self.key.sequence
    }

    pub fn name(&self) -> &StepName {
        &self.name
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    /// Run the step's behavior. Statements deferred through the context are
    /// left queued; the caller flushes them.
    pub fn migrate(&self, ctx: &mut MigrationContext<'_>) -> StepResult<()> {
        match &self.kind {
            StepKind::Sql(sql) => {
                ctx.database().execute_batch(sql)?;
                Ok(())
            }
            StepKind::AddPropertyGroupColumns => property_group::migrate(ctx),
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.key, self.name)
    }
}
