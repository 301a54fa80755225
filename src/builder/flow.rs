//! Builder for flow definitions.

use crate::builder::error::BuildError;
use crate::core::FlowDefinition;
use crate::validation::flow_violations;

/// Builds a [`FlowDefinition`] step by step, validating it on
/// [`FlowBuilder::build`].
#[derive(Clone, Debug)]
pub struct FlowBuilder {
    name: String,
    steps: Vec<String>,
}

impl FlowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append one step.
    pub fn step(mut self, page_id: impl Into<String>) -> Self {
        self.steps.push(page_id.into());
        self
    }

    /// Append several steps in order.
    pub fn steps<I, S>(mut self, page_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.extend(page_ids.into_iter().map(Into::into));
        self
    }

    /// Build the definition, reporting every violation at once.
    pub fn build(self) -> Result<FlowDefinition, BuildError> {
        let definition = FlowDefinition::new(self.name, self.steps);
        let violations = flow_violations(&definition);
        if !violations.is_empty() {
            return Err(BuildError::InvalidFlow {
                name: definition.name,
                violations,
            });
        }
        Ok(definition)
    }
}
