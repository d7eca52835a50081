//! Strongly-typed table name wrapper.

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::{is_plain_identifier, quote_ident};
use std::fmt;

/// Schema assumed when a table name is not qualified.
pub const DEFAULT_SCHEMA: &str = "main";

/// Validated, optionally schema-qualified table name (`table` or `schema.table`).
///
/// Both parts must be plain identifiers, so a `TableName` can be spliced
/// into generated DDL after quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName {
    schema: Option<String>,
    table: String,
}

impl TableName {
    /// Parse `table` or `schema.table`.
    pub fn parse(name: &str) -> CoreResult<Self> {
        let invalid = |reason| CoreError::InvalidIdentifier {
            kind: "table name",
            input: name.to_string(),
            reason,
        };

        let (schema, table) = match name.split_once('.') {
            Some((schema, table)) => (Some(schema), table),
            None => (None, name),
        };

        if let Some(schema) = schema {
            if !is_plain_identifier(schema) {
                return Err(invalid("schema must be a plain identifier"));
            }
        }
        if !is_plain_identifier(table) {
            return Err(invalid("table must be a plain identifier"));
        }

        Ok(Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        })
    }

    /// Schema part, defaulting to [`DEFAULT_SCHEMA`].
    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Unqualified table part.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fully quoted, schema-qualified form for use in SQL.
    pub fn quoted(&self) -> String {
        format!("{}.{}", quote_ident(self.schema()), quote_ident(&self.table))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => f.write_str(&self.table),
        }
    }
}

impl std::str::FromStr for TableName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
