//! Flow definition violations.

use thiserror::Error;

/// Problems found in a flow definition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FlowViolation {
    #[error("Flow name is blank")]
    BlankName,

    #[error("Flow '{flow}' has no steps")]
    NoSteps { flow: String },

    #[error("Flow '{flow}' has a blank step id at position {index}")]
    BlankStep { flow: String, index: usize },

    #[error("Flow '{flow}' lists step '{step}' more than once")]
    DuplicateStep { flow: String, step: String },
}
