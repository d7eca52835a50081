//! sw-core - Core library for Stepwise
//!
//! This crate provides the shared vocabulary of the migration engine: schema
//! versions, validated identifiers (products, steps, tables), SQL quoting
//! helpers, and `stepwise.yml` configuration parsing.

pub mod config;
pub mod error;
mod identifier;
pub mod sql_utils;
pub mod table_name;
pub mod version;

pub use config::{Config, DatabaseConfig};
pub use error::{CoreError, CoreResult};
pub use identifier::{ProductName, StepName};
pub use table_name::TableName;
pub use version::SchemaVersion;
