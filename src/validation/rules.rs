//! Validation rules for flow definitions.

use crate::core::FlowDefinition;
use crate::validation::violations::FlowViolation;
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Validate a flow definition, accumulating ALL violations.
///
/// Returns `Validation::Success(())` if the definition is usable, or
/// `Validation::Failure` carrying every problem found.
pub fn validate_flow(definition: &FlowDefinition) -> Validation<(), NonEmptyVec<FlowViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<FlowViolation>>> = Vec::new();
    let flow = definition.name.clone();

    checks.push(if definition.name.trim().is_empty() {
        Validation::fail(FlowViolation::BlankName)
    } else {
        Validation::success(())
    });

    checks.push(if definition.steps.is_empty() {
        Validation::fail(FlowViolation::NoSteps { flow: flow.clone() })
    } else {
        Validation::success(())
    });

    let mut seen = HashSet::new();
    for (index, step) in definition.steps.iter().enumerate() {
        if step.trim().is_empty() {
            checks.push(Validation::fail(FlowViolation::BlankStep {
                flow: flow.clone(),
                index,
            }));
        } else if !seen.insert(step.as_str()) {
            checks.push(Validation::fail(FlowViolation::DuplicateStep {
                flow: flow.clone(),
                step: step.clone(),
            }));
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Collect the violations of a definition, empty when it is valid.
pub fn flow_violations(definition: &FlowDefinition) -> Vec<FlowViolation> {
    match validate_flow(definition) {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}
