//! Build errors for navigator and flow builders.

use crate::engine::NavigationError;
use crate::validation::FlowViolation;
use thiserror::Error;

/// Errors that can occur when building navigators and flows.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Main page not specified. Call .main_page(page) before .build()")]
    MissingMainPage,

    #[error("Flow '{name}' is invalid: {violations:?}")]
    InvalidFlow {
        name: String,
        violations: Vec<FlowViolation>,
    },

    #[error("Navigator setup failed: {0}")]
    Setup(#[from] NavigationError),
}
