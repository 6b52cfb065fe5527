//! Explicit install ordering.
//!
//! Install order used to be encoded implicitly by script sequence; here it is
//! a declared list of steps with named prerequisites, so a reordering is a
//! detectable error instead of a silent correctness bug (stale or mismatched
//! native bindings).

use crate::pipeline::error::{Error, Result};
use crate::pipeline::resolver::ResolvedDependency;
use std::collections::HashSet;

/// What a single install step does.
#[derive(Clone, Debug)]
pub enum StepKind {
    /// Fetch and install a resolved dependency artifact
    Dependency(ResolvedDependency),
    /// Install the application's own dependency manifest into the interpreter
    /// environment (`pip install -r <file>`)
    PipRequirements(&'static str),
    /// Install the in-tree application package itself (`pip install .`)
    PipApplication,
}

/// One unit of the install sequence.
#[derive(Clone, Debug)]
pub struct InstallStep {
    /// Step name, referenced by later steps' prerequisites
    pub name: &'static str,
    /// Names of steps that must have run before this one
    pub requires: &'static [&'static str],
    /// The work this step performs
    pub kind: StepKind,
}

/// Checks that every step's prerequisites appear earlier in the list.
///
/// Declared order is execution order; this only verifies that the declaration
/// respects its own prerequisites, it never reorders.
pub fn validate_order(steps: &[InstallStep]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for step in steps {
        for req in step.requires {
            if !seen.contains(req) {
                return Err(Error::PlanOrder {
                    step: step.name.to_string(),
                    requires: req.to_string(),
                });
            }
        }
        seen.insert(step.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &'static str, requires: &'static [&'static str]) -> InstallStep {
        InstallStep {
            name,
            requires,
            kind: StepKind::PipApplication,
        }
    }

    #[test]
    fn well_ordered_plan_validates() {
        let steps = [
            step("native-extension", &[]),
            step("requirements", &["native-extension"]),
            step("application", &["requirements"]),
        ];
        validate_order(&steps).unwrap();
    }

    #[test]
    fn prerequisite_after_dependent_is_rejected() {
        let steps = [
            step("requirements", &["native-extension"]),
            step("native-extension", &[]),
        ];
        let err = validate_order(&steps).unwrap_err();
        assert!(matches!(err, Error::PlanOrder { .. }));
    }

    #[test]
    fn unknown_prerequisite_is_rejected() {
        let steps = [step("application", &["missing"])];
        assert!(validate_order(&steps).is_err());
    }
}
