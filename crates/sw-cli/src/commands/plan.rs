//! Plan command implementation

use anyhow::Result;
use serde::Serialize;
use sw_core::SchemaVersion;
use sw_migrate::{LogSink, Orchestrator};

use crate::cli::{GlobalArgs, OutputFormat, PlanArgs};
use crate::commands::common::{build_plan, load_project, open_database, print_json, print_table};

#[derive(Debug, Serialize)]
struct PlannedStep {
    version: SchemaVersion,
    sequence: u32,
    name: String,
    kind: &'static str,
    applied: bool,
}

/// Execute the plan command
pub(crate) fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = open_database(&project)?;
    let plan = build_plan(&project)?;

    let sink = LogSink;
    let orchestrator = Orchestrator::new(&db, &sink, plan, project.config.resolve_lock_holder());
    let current = orchestrator.current_version()?;

    let steps: Vec<PlannedStep> = orchestrator
        .plan()
        .steps()
        .iter()
        .map(|step| PlannedStep {
            version: step.version(),
            sequence: step.sequence(),
            name: step.name().to_string(),
            kind: step.kind().label(),
            applied: current.is_some_and(|c| step.version() <= c),
        })
        .collect();

    if args.output == OutputFormat::Json {
        return print_json(&steps);
    }

    let rows: Vec<Vec<String>> = steps
        .iter()
        .map(|s| {
            vec![
                s.version.to_string(),
                s.sequence.to_string(),
                s.name.clone(),
                s.kind.to_string(),
                (if s.applied { "applied" } else { "pending" }).to_string(),
            ]
        })
        .collect();
    print_table(&["VERSION", "SEQ", "NAME", "KIND", "STATUS"], &rows);
    Ok(())
}
