//! Unlock command implementation

use anyhow::{Context, Result};
use sw_migrate::{LogSink, Orchestrator};

use crate::cli::GlobalArgs;
use crate::commands::common::{build_plan, load_project, open_database};

/// Execute the unlock command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = open_database(&project)?;
    let plan = build_plan(&project)?;

    let sink = LogSink;
    let orchestrator = Orchestrator::new(&db, &sink, plan, project.config.resolve_lock_holder());
    let released = orchestrator
        .release_lock()
        .context("Failed to release migration lock")?;

    if released {
        println!("Released migration lock for '{}'", project.config.product);
    } else {
        println!("No migration lock held for '{}'", project.config.product);
    }
    Ok(())
}
