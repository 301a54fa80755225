//! Navigator usage errors.

use crate::validation::FlowViolation;
use thiserror::Error;

/// Errors returned to callers that misuse the navigator.
///
/// These are never retried. Persistence and listener failures are not
/// represented here: they are logged and swallowed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("'{operation}' called before setup(); call setup() first")]
    NotInitialized { operation: &'static str },

    #[error("setup() was already called on this navigator")]
    AlreadyInitialized,

    #[error("Flow '{name}' is not registered")]
    UnknownFlow { name: String },

    #[error("Step '{step}' is not part of flow '{flow}'")]
    UnknownStep { flow: String, step: String },

    #[error("Flow '{flow}' must continue with step '{expected}', not '{found}'")]
    StepOutOfOrder {
        flow: String,
        expected: String,
        found: String,
    },

    #[error("Flow '{flow}' is already at its last step")]
    FlowComplete { flow: String },

    #[error("No flow is active")]
    NoActiveFlow,

    #[error("Flow '{name}' is invalid: {violations:?}")]
    InvalidFlow {
        name: String,
        violations: Vec<FlowViolation>,
    },
}
