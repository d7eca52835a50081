//! Ordered set of steps declared for one product.

use crate::error::OrchestratorStateError;
use crate::step::MigrationStep;
use std::collections::HashSet;
use sw_core::{ProductName, SchemaVersion};

/// Every step a product declares, sorted by `(version, sequence)`.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    product: ProductName,
    steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    /// Sort and validate `steps`. Two steps sharing a `(version, sequence)`
    /// key or a name make the plan invalid.
    pub fn new(product: ProductName, mut steps: Vec<MigrationStep>) -> Result<Self, OrchestratorStateError> {
        steps.sort_by_key(MigrationStep::key);

        let mut names = HashSet::new();
        for (i, step) in steps.iter().enumerate() {
            if i > 0 && steps[i - 1].key() == step.key() {
                return Err(OrchestratorStateError::InvalidPlan(format!(
                    "steps '{}' and '{}' share the ordering key {}",
                    steps[i - 1].name(),
                    step.name(),
                    step.key()
                )));
            }
            if !names.insert(step.name().as_str()) {
                return Err(OrchestratorStateError::InvalidPlan(format!(
                    "step name '{}' is declared more than once",
                    step.name()
                )));
            }
        }

        Ok(Self { product, steps })
    }

    pub fn product(&self) -> &ProductName {
        &self.product
    }

    /// All steps in execution order.
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Highest version any step targets.
    pub fn latest_version(&self) -> Option<SchemaVersion> {
        self.steps.last().map(MigrationStep::version)
    }

    /// Steps with `current < version <= target`, in execution order. With no
    /// current version every step up to `target` is pending.
    pub fn pending(&self, current: Option<SchemaVersion>, target: SchemaVersion) -> Vec<&MigrationStep> {
        self.steps
            .iter()
            .filter(|s| current.map_or(true, |c| s.version() > c) && s.version() <= target)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(minor: u32) -> SchemaVersion {
        SchemaVersion::new(1, minor, 0)
    }

    fn step(minor: u32, sequence: u32, name: &str) -> MigrationStep {
        MigrationStep::sql(v(minor), sequence, name, "SELECT 1").unwrap()
    }

    fn plan(steps: Vec<MigrationStep>) -> Result<MigrationPlan, OrchestratorStateError> {
        MigrationPlan::new(ProductName::new("cms").unwrap(), steps)
    }

    #[test]
    fn sorts_by_version_then_sequence() {
        let plan = plan(vec![step(2, 1, "c"), step(1, 2, "b"), step(1, 1, "a")]).unwrap();
        let names: Vec<&str> = plan.steps().iter().map(|s| s.name().as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(plan.latest_version(), Some(v(2)));
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = plan(vec![step(1, 1, "a"), step(1, 1, "b")]).unwrap_err();
        assert!(matches!(err, OrchestratorStateError::InvalidPlan(_)));
    }

    #[test]
    fn duplicate_name_rejected() {
        let err = plan(vec![step(1, 1, "a"), step(2, 1, "a")]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn pending_window_is_half_open() {
        let plan = plan(vec![step(0, 1, "a"), step(1, 1, "b"), step(2, 1, "c"), step(3, 1, "d")]).unwrap();
        let names = |steps: Vec<&MigrationStep>| -> Vec<String> {
            steps.iter().map(|s| s.name().to_string()).collect()
        };
        assert_eq!(names(plan.pending(None, v(1))), ["a", "b"]);
        assert_eq!(names(plan.pending(Some(v(1)), v(3))), ["c", "d"]);
        assert!(plan.pending(Some(v(3)), v(3)).is_empty());
    }

    #[test]
    fn empty_plan_has_no_latest_version() {
        assert_eq!(plan(Vec::new()).unwrap().latest_version(), None);
    }
}
