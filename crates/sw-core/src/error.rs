//! Error types for sw-core

use thiserror::Error;

/// Core error type for Stepwise
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Schema version string could not be parsed
    #[error("[E003] Invalid schema version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    /// E004: Identifier (product, step, table, column) is malformed
    #[error("[E004] Invalid {kind} '{input}': {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        input: String,
        reason: &'static str,
    },

    /// E005: IO error with file path context
    #[error("[E005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E006: YAML parse error
    #[error("[E006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
