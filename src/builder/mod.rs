//! Builder API for ergonomic navigator construction.
//!
//! This module provides fluent builders and the [`flow!`](crate::flow) macro
//! for declaring flows and wiring a navigator with minimal boilerplate.

pub mod error;
pub mod flow;
pub mod macros;
pub mod navigator;

pub use error::BuildError;
pub use flow::FlowBuilder;
pub use navigator::NavigatorBuilder;
