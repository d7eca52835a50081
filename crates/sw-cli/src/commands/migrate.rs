//! Migrate command implementation

use anyhow::{Context, Result};
use sw_migrate::{LogSink, Orchestrator};

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{build_plan, load_project, open_database, print_json, version_or_none};

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = open_database(&project)?;
    let plan = build_plan(&project)?;
    let target = args.target.or(project.config.target_version);
    let holder = project.config.resolve_lock_holder();

    if global.verbose {
        eprintln!(
            "[verbose] Migrating '{}' to {} as {}",
            project.config.product,
            version_or_none(target.or(plan.latest_version())),
            holder
        );
    }

    let sink = LogSink;
    let mut orchestrator = Orchestrator::new(&db, &sink, plan, holder);
    let outcome = orchestrator
        .run(target)
        .with_context(|| format!("Migration of '{}' failed", project.config.product))?;

    if args.output == OutputFormat::Json {
        return print_json(&outcome);
    }

    if outcome.is_noop() {
        println!("'{}' is already at {}", outcome.product, outcome.to);
        return Ok(());
    }

    println!(
        "Migrated '{}' from {} to {}",
        outcome.product,
        version_or_none(outcome.from),
        outcome.to
    );
    for step in &outcome.applied {
        println!("  applied  {} #{} {}", step.version, step.sequence, step.name);
    }
    for step in &outcome.skipped {
        println!("  skipped  {} #{} {} (already applied)", step.version, step.sequence, step.name);
    }
    if outcome.warnings > 0 {
        println!("{} warning(s) were reported; see the log output above", outcome.warnings);
    }
    Ok(())
}
