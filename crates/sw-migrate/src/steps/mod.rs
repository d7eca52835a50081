//! Steps shipped with Stepwise and the plan they form.

pub mod property_group;

use crate::error::OrchestratorStateError;
use crate::plan::MigrationPlan;
use crate::step::MigrationStep;
use sw_core::{CoreResult, ProductName, SchemaVersion};

/// Product whose schema the shipped steps migrate.
pub const CMS_PRODUCT: &str = "cms";

const CONTENT_TYPES_SQL: &str = include_str!("sql/v1_0_0_content_types.sql");
const PROPERTY_GROUP_AUDIT_SQL: &str = include_str!("sql/v1_2_0_property_group_audit.sql");

fn cms_steps() -> CoreResult<Vec<MigrationStep>> {
    Ok(vec![
        MigrationStep::sql(
            SchemaVersion::new(1, 0, 0),
            1,
            "create_content_types",
            CONTENT_TYPES_SQL,
        )?,
        MigrationStep::add_property_group_columns(SchemaVersion::new(1, 1, 0), 1)?,
        MigrationStep::sql(
            SchemaVersion::new(1, 2, 0),
            1,
            "create_property_group_audit",
            PROPERTY_GROUP_AUDIT_SQL,
        )?,
    ])
}

/// Build the plan for the `cms` product. Built fresh for every run.
pub fn cms_plan() -> Result<MigrationPlan, OrchestratorStateError> {
    let invalid = |e: sw_core::CoreError| OrchestratorStateError::InvalidPlan(e.to_string());
    let product = ProductName::new(CMS_PRODUCT).map_err(invalid)?;
    MigrationPlan::new(product, cms_steps().map_err(invalid)?)
}

/// Plan for `product`, if Stepwise ships one.
pub fn plan_for(product: &ProductName) -> Result<MigrationPlan, OrchestratorStateError> {
    if product.as_str() == CMS_PRODUCT {
        cms_plan()
    } else {
        Err(OrchestratorStateError::InvalidPlan(format!(
            "no migration steps are declared for product '{product}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::StepKind;

    #[test]
    fn cms_plan_is_valid_and_ordered() {
        let plan = cms_plan().unwrap();
        assert_eq!(plan.product(), &ProductName::new("cms").unwrap());
        assert_eq!(plan.latest_version(), Some(SchemaVersion::new(1, 2, 0)));
        assert_eq!(plan.steps()[1].kind(), &StepKind::AddPropertyGroupColumns);
        assert_eq!(plan.steps()[1].name(), &property_group::STEP_NAME);
    }

    #[test]
    fn unknown_product_has_no_plan() {
        let err = plan_for(&ProductName::new("shop").unwrap()).unwrap_err();
        assert!(err.to_string().contains("shop"));
    }
}
