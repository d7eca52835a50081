//! Property group `type` and `alias` columns.
//!
//! Property groups used to be identified by their display text only. This
//! step adds an integer `type` (0 = plain group) and an `alias` derived
//! from the text with [`SafeAlias`], unique within the owning content type.
//! Groups whose texts differ but fold to the same alias are told apart by
//! numeric suffixes, and each such clash is reported once as a warning since
//! external references to the old alias may need attention.

use crate::alias::{plan_aliases, AliasAssignment, LabelledRow, SafeAlias};
use crate::context::MigrationContext;
use crate::error::{SchemaMutationError, StepFailure, StepResult};
use crate::schema::{AddColumnMode, ColumnDefault, ColumnDescriptor, ColumnType};
use std::collections::{HashMap, HashSet};
use sw_core::TableName;
use sw_db::{Criteria, DbError, DbResult, Entity, Value};

pub const STEP_NAME: &str = "add_property_group_columns";

/// Table holding property groups.
pub const TABLE: &str = "cms_property_group";

/// Column owning a group; aliases are unique per owner.
pub const OWNER_COLUMN: &str = "content_type_id";

const COLLISION_TEMPLATE: &str = "Detected the same alias {Alias} for different property group names {Names}, suffixes were added, but this might break backwards compatibility.";

/// One property group, as far as this step cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyGroupRow {
    pub id: i64,
    pub content_type_id: i64,
    pub text: String,
    pub alias: Option<String>,
}

impl Entity for PropertyGroupRow {
    const TABLE: &'static str = TABLE;
    const KEY: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", OWNER_COLUMN, "text", "alias"];

    fn from_row(row: Vec<Value>) -> DbResult<Self> {
        let mut cells = row.into_iter();
        let id = cells
            .next()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| conversion("id", "expected an integer"))?;
        let content_type_id = cells
            .next()
            .and_then(|v| v.as_i64())
            .ok_or_else(|| conversion(OWNER_COLUMN, "expected an integer"))?;
        let text = cells
            .next()
            .and_then(Value::into_text)
            .ok_or_else(|| conversion("text", "expected text"))?;
        let alias = cells.next().and_then(Value::into_text);
        Ok(Self {
            id,
            content_type_id,
            text,
            alias,
        })
    }

    fn key(&self) -> Value {
        self.id.into()
    }

    fn field(&self, column: &str) -> Option<Value> {
        match column {
            "id" => Some(self.id.into()),
            OWNER_COLUMN => Some(self.content_type_id.into()),
            "text" => Some(self.text.as_str().into()),
            "alias" => Some(self.alias.clone().into()),
            _ => None,
        }
    }
}

fn conversion(column: &str, message: &str) -> DbError {
    DbError::Conversion {
        table: TABLE.to_string(),
        column: column.to_string(),
        message: message.to_string(),
    }
}

fn columns() -> Result<(ColumnDescriptor, ColumnDescriptor), SchemaMutationError> {
    let table = TableName::parse(TABLE)?;
    let group_type = ColumnDescriptor::new(table.clone(), "type", ColumnType::Integer)?
        .not_null()
        .default_value(ColumnDefault::Integer(0));
    let alias = ColumnDescriptor::new(table, "alias", ColumnType::Varchar)?
        .not_null()
        .unique_within(&[OWNER_COLUMN])?;
    Ok((group_type, alias))
}

pub(crate) fn migrate(ctx: &mut MigrationContext<'_>) -> StepResult<()> {
    let (group_type, alias) = columns()?;
    ctx.add_column(&group_type, AddColumnMode::Immediate)?;
    ctx.add_column(&alias, AddColumnMode::Deferred)?;

    let groups: Vec<PropertyGroupRow> = ctx.fetch(&Criteria::all().order_by("id"))?;
    let labelled: Vec<LabelledRow> = groups
        .iter()
        .map(|g| LabelledRow::new(g.id, g.text.as_str()))
        .collect();
    let plan = plan_aliases(&labelled, &SafeAlias);

    let by_id: HashMap<i64, &PropertyGroupRow> = groups.iter().map(|g| (g.id, g)).collect();
    check_unique_per_owner(&plan.assignments, &by_id)?;
    let mut updated = 0usize;
    for assignment in &plan.assignments {
        let Some(group) = by_id.get(&assignment.id) else {
            continue;
        };
        if group.alias.as_deref() == Some(assignment.alias.as_str()) {
            continue;
        }
        let row = PropertyGroupRow {
            alias: Some(assignment.alias.clone()),
            ..(*group).clone()
        };
        ctx.update(&row, &["alias"])?;
        updated += 1;
    }
    log::debug!(
        "Assigned aliases to {} of {} property group(s)",
        updated,
        groups.len()
    );

    for collision in &plan.collisions {
        ctx.emit(
            ctx.warn(COLLISION_TEMPLATE)
                .with("Alias", collision.alias.as_str())
                .with("Names", collision.texts.clone()),
        );
    }
    Ok(())
}

/// Identical texts share an alias, so two same-named groups under one
/// content type would break the per-owner index. Refuse before writing.
fn check_unique_per_owner(
    assignments: &[AliasAssignment],
    by_id: &HashMap<i64, &PropertyGroupRow>,
) -> StepResult<()> {
    let mut seen = HashSet::new();
    for assignment in assignments {
        let Some(group) = by_id.get(&assignment.id) else {
            continue;
        };
        if !seen.insert((group.content_type_id, assignment.alias.as_str())) {
            return Err(StepFailure::InvalidData(format!(
                "content type {} has more than one property group named '{}' (alias '{}'); rename one before migrating",
                group.content_type_id, group.text, assignment.alias
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "property_group_test.rs"]
mod tests;
