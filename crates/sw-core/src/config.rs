//! Configuration types and parsing for stepwise.yml

use crate::error::{CoreError, CoreResult};
use crate::identifier::ProductName;
use crate::version::SchemaVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names probed by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stepwise.yml", "stepwise.yaml"];

const MEMORY_DB_PATH: &str = ":memory:";

/// Migration host configuration from stepwise.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Product whose schema version is tracked
    pub product: ProductName,

    /// Version to migrate to. Defaults to the highest version declared by
    /// the migration plan.
    #[serde(default)]
    pub target_version: Option<SchemaVersion>,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Identity written into the migration lock row. Defaults to
    /// `stepwise:<pid>`.
    #[serde(default)]
    pub lock_holder: Option<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    MEMORY_DB_PATH.to_string()
}

impl DatabaseConfig {
    /// Whether the database lives only in memory.
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_DB_PATH
    }

    /// Resolve the database path against a project root. `:memory:` and
    /// absolute paths are returned unchanged.
    pub fn path_absolute(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.path);
        if self.is_memory() || path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config for product '{}' from {}", config.product, path.display());
        Ok(config)
    }

    /// Load configuration from a project directory.
    /// Looks for stepwise.yml or stepwise.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if let Some(holder) = &self.lock_holder {
            if holder.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: "lock_holder cannot be blank when set".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Lock holder identity, falling back to `<host>:<pid>`.
    pub fn resolve_lock_holder(&self) -> String {
        self.lock_holder
            .clone()
            .unwrap_or_else(|| default_lock_holder(|key| std::env::var(key).ok()))
    }
}

/// `<host>:<pid>`, with the host taken from `HOSTNAME` or `COMPUTERNAME`
/// and `stepwise` when neither is set.
fn default_lock_holder(env: impl Fn(&str) -> Option<String>) -> String {
    let host = ["HOSTNAME", "COMPUTERNAME"]
        .into_iter()
        .filter_map(|key| env(key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "stepwise".to_string());
    format!("{host}:{}", std::process::id())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
