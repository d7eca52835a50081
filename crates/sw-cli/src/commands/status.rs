//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sw_core::SchemaVersion;
use sw_migrate::orchestrator::StepSummary;
use sw_migrate::record::{LockInfo, LogEntry, RecordStore};

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common::{
    build_plan, load_project, open_database, print_json, print_table, version_or_none,
};

#[derive(Debug, Serialize)]
struct StatusReport {
    product: String,
    current_version: Option<SchemaVersion>,
    latest_version: Option<SchemaVersion>,
    pending: Vec<StepSummary>,
    lock: Option<LockInfo>,
    history: Vec<LogEntry>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let db = open_database(&project)?;
    let plan = build_plan(&project)?;
    let product = &project.config.product;

    let records = RecordStore::new(&db);
    records.ensure().context("Failed to prepare migration record")?;
    let current = records
        .current_version(product)
        .context("Failed to read recorded version")?;
    let lock = records
        .lock_holder(product)
        .context("Failed to read migration lock")?;
    let mut history = records
        .history(product)
        .context("Failed to read migration log")?;
    history.reverse();
    history.truncate(args.limit);

    let latest = plan.latest_version();
    let pending: Vec<StepSummary> = match latest {
        Some(latest) => plan
            .pending(current, latest)
            .into_iter()
            .map(StepSummary::from)
            .collect(),
        None => Vec::new(),
    };

    let report = StatusReport {
        product: product.to_string(),
        current_version: current,
        latest_version: latest,
        pending,
        lock,
        history,
    };

    if args.output == OutputFormat::Json {
        return print_json(&report);
    }

    println!("Product:  {}", report.product);
    println!("Version:  {}", version_or_none(report.current_version));
    println!("Latest:   {}", version_or_none(report.latest_version));
    println!("Pending:  {} step(s)", report.pending.len());
    match &report.lock {
        Some(lock) => println!(
            "Lock:     held by {} since {} (run `sw unlock` if that run crashed)",
            lock.holder, lock.acquired_at
        ),
        None => println!("Lock:     free"),
    }

    if report.history.is_empty() {
        return Ok(());
    }
    println!();
    let rows: Vec<Vec<String>> = report
        .history
        .iter()
        .map(|e| {
            vec![
                e.logged_at.clone(),
                e.version.to_string(),
                e.sequence.to_string(),
                e.step.clone(),
                (if e.succeeded { "ok" } else { "FAILED" }).to_string(),
                e.detail.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["LOGGED AT", "VERSION", "SEQ", "STEP", "RESULT", "DETAIL"], &rows);
    Ok(())
}
