//! Typed row mapping on top of the raw [`Database`] contract.
//!
//! An [`Entity`] declares its table, key column, and mapped columns; the
//! [`EntityStore`] extension trait then provides `fetch` and field-targeted
//! `update` for any `Database`, including `dyn Database`.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use crate::value::Value;
use sw_core::sql_utils::quote_ident;
use sw_core::TableName;

/// A row type mapped onto one table.
pub trait Entity: Sized {
    /// Table the entity is stored in (`table` or `schema.table`)
    const TABLE: &'static str;

    /// Column uniquely identifying a row
    const KEY: &'static str;

    /// Mapped columns, in the order [`Entity::from_row`] receives them
    const COLUMNS: &'static [&'static str];

    /// Build the entity from one row whose cells follow [`Entity::COLUMNS`]
    fn from_row(row: Vec<Value>) -> DbResult<Self>;

    /// Current value of the key column
    fn key(&self) -> Value;

    /// Current value of a mapped column, or `None` if it is not mapped
    fn field(&self, column: &str) -> Option<Value>;

    /// Parsed table name
    fn table_name() -> DbResult<TableName> {
        TableName::parse(Self::TABLE).map_err(|e| DbError::ExecutionError(e.to_string()))
    }
}

/// Row selection for [`EntityStore::fetch`].
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    filter: Option<String>,
    params: Vec<Value>,
    order_by: Vec<String>,
}

impl Criteria {
    /// Every row, in backend order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to rows matching a `WHERE` fragment with `?` placeholders.
    pub fn filter(mut self, predicate: impl Into<String>, params: Vec<Value>) -> Self {
        self.filter = Some(predicate.into());
        self.params = params;
        self
    }

    /// Append an ascending sort column.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    fn to_sql<T: Entity>(&self, table: &TableName) -> String {
        let columns = T::COLUMNS
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {columns} FROM {}", table.quoted());
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }
        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        sql
    }
}

/// Entity-level fetch and update, available on every [`Database`].
pub trait EntityStore {
    /// Fetch all rows of `T` matching `criteria`
    fn fetch<T: Entity>(&self, criteria: &Criteria) -> DbResult<Vec<T>>;

    /// Write the listed fields of `row` back to its table, addressed by key.
    ///
    /// Fails with [`DbError::RowNotFound`] when no row carries the key.
    fn update<T: Entity>(&self, row: &T, fields: &[&str]) -> DbResult<()>;
}

impl<D: Database + ?Sized> EntityStore for D {
    fn fetch<T: Entity>(&self, criteria: &Criteria) -> DbResult<Vec<T>> {
        let table = T::table_name()?;
        let sql = criteria.to_sql::<T>(&table);
        self.query_rows(&sql, &criteria.params)?
            .into_iter()
            .map(T::from_row)
            .collect()
    }

    fn update<T: Entity>(&self, row: &T, fields: &[&str]) -> DbResult<()> {
        let table = T::table_name()?;
        if fields.is_empty() {
            return Ok(());
        }

        let mut assignments = Vec::with_capacity(fields.len());
        let mut params = Vec::with_capacity(fields.len() + 1);
        for field in fields {
            let value = row.field(field).ok_or_else(|| DbError::UnknownColumn {
                table: table.to_string(),
                column: field.to_string(),
            })?;
            assignments.push(format!("{} = ?", quote_ident(field)));
            params.push(value);
        }
        let key = row.key();
        params.push(key.clone());

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table.quoted(),
            assignments.join(", "),
            quote_ident(T::KEY)
        );
        let changed = self.execute_with(&sql, &params)?;
        if changed == 0 {
            return Err(DbError::RowNotFound {
                table: table.to_string(),
                key: T::KEY.to_string(),
                value: key.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "entity_test.rs"]
mod tests;
