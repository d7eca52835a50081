//! sw-db - Data-access layer for Stepwise
//!
//! This crate provides the `Database` contract the migration engine talks
//! to, the `Entity` mapping used for typed fetch/update of table rows, and a
//! DuckDB implementation of the contract.

pub mod duckdb;
pub mod entity;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::DuckDbBackend;
pub use entity::{Criteria, Entity, EntityStore};
pub use error::{DbError, DbResult};
pub use traits::{ColumnInfo, Database};
pub use value::Value;
