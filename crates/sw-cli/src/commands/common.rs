//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use sw_core::Config;
use sw_db::DuckDbBackend;
use sw_migrate::steps::plan_for;
use sw_migrate::MigrationPlan;

use crate::cli::GlobalArgs;

/// Loaded configuration plus the directory relative paths resolve against.
pub(crate) struct Project {
    pub config: Config,
    pub root: PathBuf,
}

/// Load the configuration named by `--config`, or the one found in
/// `--project-dir`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load configuration")?;
    Ok(Project { config, root })
}

/// Open the configured database, creating the file's directory if needed.
pub(crate) fn open_database(project: &Project) -> Result<DuckDbBackend> {
    let db_config = &project.config.database;
    if db_config.is_memory() {
        log::warn!("database.path is :memory:, so migration progress is not persisted");
        return DuckDbBackend::in_memory().context("Failed to open in-memory database");
    }

    let path = db_config.path_absolute(&project.root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    log::debug!("Opening database {}", path.display());
    DuckDbBackend::from_path(&path)
        .with_context(|| format!("Failed to open database {}", path.display()))
}

/// Build the migration plan for the configured product.
pub(crate) fn build_plan(project: &Project) -> Result<MigrationPlan> {
    plan_for(&project.config.product).context("Failed to build migration plan")
}

/// Print a value as pretty JSON to stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a left-aligned table with a dashed separator under the header.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);
    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(headers.iter().map(|h| h.to_string()).collect()));
    println!("{}", line(widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        println!("{}", line(row.clone()));
    }
}

/// Render an optional version for display.
pub(crate) fn version_or_none<T: std::fmt::Display>(version: Option<T>) -> String {
    version.map_or_else(|| "(none)".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_widths_cover_headers_and_cells() {
        let widths = calculate_column_widths(
            &["VERSION", "NAME"],
            &[
                vec!["1.0.0".to_string(), "create_content_types".to_string()],
                vec!["10.20.30".to_string(), "x".to_string()],
            ],
        );
        assert_eq!(widths, [8, 20]);
    }

    #[test]
    fn missing_version_is_spelled_out() {
        assert_eq!(version_or_none::<String>(None), "(none)");
        assert_eq!(version_or_none(Some("1.0.0")), "1.0.0");
    }
}
