//! Schema-mutation primitives.
//!
//! [`add_column`] adds a column described by a [`ColumnDescriptor`] to an
//! existing table. It inspects the live schema first, so calling it again
//! after a full or partial earlier application only emits what is still
//! missing.

use crate::error::SchemaMutationError;
use sw_core::sql_utils::{is_plain_identifier, quote_ident, quote_literal};
use sw_core::{CoreError, TableName};
use sw_db::{ColumnInfo, Database};

/// Logical column types understood by the primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Double,
    Boolean,
    Varchar,
    Timestamp,
}

impl ColumnType {
    /// Type name used in DDL and reported by `information_schema`.
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }

    fn matches(&self, data_type: &str) -> bool {
        data_type.eq_ignore_ascii_case(self.sql_name())
            || (*self == ColumnType::Varchar && data_type.to_ascii_uppercase().starts_with("VARCHAR"))
    }
}

/// Literal default applied to existing and future rows.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl ColumnDefault {
    fn to_sql(&self) -> String {
        match self {
            ColumnDefault::Integer(n) => n.to_string(),
            ColumnDefault::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            ColumnDefault::Text(s) => quote_literal(s),
        }
    }
}

/// Logical description of a column to add. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    table: TableName,
    name: String,
    column_type: ColumnType,
    nullable: bool,
    default: Option<ColumnDefault>,
    unique: bool,
    unique_scope: Vec<String>,
}

impl ColumnDescriptor {
    /// A nullable, non-unique column without default.
    pub fn new(
        table: TableName,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> Result<Self, SchemaMutationError> {
        let name = name.into();
        if !is_plain_identifier(&name) {
            return Err(CoreError::InvalidIdentifier {
                kind: "column name",
                input: name,
                reason: "must be a plain identifier",
            }
            .into());
        }
        Ok(Self {
            table,
            name,
            column_type,
            nullable: true,
            default: None,
            unique: false,
            unique_scope: Vec::new(),
        })
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Enforce uniqueness with a unique index.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Enforce uniqueness among rows sharing the values of `scope`. The
    /// index covers the scope columns followed by this column.
    pub fn unique_within(mut self, scope: &[&str]) -> Result<Self, SchemaMutationError> {
        for column in scope {
            if !is_plain_identifier(column) {
                return Err(CoreError::InvalidIdentifier {
                    kind: "column name",
                    input: column.to_string(),
                    reason: "must be a plain identifier",
                }
                .into());
            }
        }
        self.unique = true;
        self.unique_scope = scope.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Columns the uniqueness is scoped to; empty for table-wide.
    pub fn unique_scope(&self) -> &[String] {
        &self.unique_scope
    }

    /// Name of the unique index backing a unique column.
    pub fn index_name(&self) -> String {
        format!("ux_{}_{}", self.table.table(), self.name)
    }

    fn describe(&self) -> String {
        format!(
            "{}{}",
            self.column_type.sql_name(),
            if self.nullable { " NULL" } else { " NOT NULL" }
        )
    }

    fn add_statement(&self) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            self.table.quoted(),
            quote_ident(&self.name),
            self.column_type.sql_name()
        );
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_sql());
        }
        sql
    }

    fn set_not_null_statement(&self) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
            self.table.quoted(),
            quote_ident(&self.name)
        )
    }

    fn unique_index_statement(&self) -> String {
        let columns: Vec<String> = self
            .unique_scope
            .iter()
            .chain(std::iter::once(&self.name))
            .map(|c| quote_ident(c))
            .collect();
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&self.index_name()),
            self.table.quoted(),
            columns.join(", ")
        )
    }
}

/// How [`add_column`] treats constraint-enforcing statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddColumnMode {
    /// Apply everything now.
    Immediate,
    /// Create the column in its permissive form (nullable, no unique index)
    /// and hand the constraint statements back for execution after a
    /// backfill.
    Deferred,
}

/// Outcome of [`add_column`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnChange {
    /// Whether the column was created by this call
    pub created: bool,
    /// Statements executed by this call, in order
    pub applied: Vec<String>,
    /// Statements the caller must execute later, in order
    pub deferred: Vec<String>,
}

impl ColumnChange {
    /// Nothing was executed and nothing is pending.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.deferred.is_empty()
    }
}

/// Add `column` to its table if it is not already there.
///
/// An existing column is accepted when its type matches and it is not
/// stricter than requested; in that case only the still-missing
/// constraint statements are produced.
pub fn add_column(
    db: &dyn Database,
    column: &ColumnDescriptor,
    mode: AddColumnMode,
) -> Result<ColumnChange, SchemaMutationError> {
    let table = column.table();
    if !db.relation_exists(table)? {
        return Err(SchemaMutationError::TableNotFound {
            table: table.to_string(),
            column: column.name().to_string(),
        });
    }

    let existing = db
        .table_columns(table)?
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(column.name()));

    let mut create = None;
    let mut enforce = Vec::new();

    match existing {
        None => {
            create = Some(column.add_statement());
            if !column.is_nullable() {
                enforce.push(column.set_not_null_statement());
            }
        }
        Some(info) => {
            check_compatible(column, &info)?;
            if !column.is_nullable() && info.nullable {
                enforce.push(column.set_not_null_statement());
            }
        }
    }
    // DuckDB refuses ALTER on a table that has dependent indexes, so the
    // index always comes last.
    if column.is_unique() {
        enforce.push(column.unique_index_statement());
    }

    let mut change = ColumnChange {
        created: create.is_some(),
        ..ColumnChange::default()
    };

    if let Some(sql) = create {
        log::debug!("Adding column {}.{}", table, column.name());
        db.execute(&sql)?;
        change.applied.push(sql);
    } else {
        log::debug!(
            "Column {}.{} already exists; {} constraint statement(s) outstanding",
            table,
            column.name(),
            enforce.len()
        );
    }

    match mode {
        AddColumnMode::Immediate => {
            for sql in enforce {
                db.execute(&sql)?;
                change.applied.push(sql);
            }
        }
        AddColumnMode::Deferred => change.deferred = enforce,
    }

    Ok(change)
}

fn check_compatible(column: &ColumnDescriptor, existing: &ColumnInfo) -> Result<(), SchemaMutationError> {
    let type_matches = column.column_type().matches(&existing.data_type);
    let stricter = !existing.nullable && column.is_nullable();
    if type_matches && !stricter {
        return Ok(());
    }
    Err(SchemaMutationError::IncompatibleColumn {
        table: column.table().to_string(),
        column: column.name().to_string(),
        existing: format!(
            "{}{}",
            existing.data_type,
            if existing.nullable { " NULL" } else { " NOT NULL" }
        ),
        requested: column.describe(),
    })
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
