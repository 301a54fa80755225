//! Validation of flow definitions.
//!
//! Uses Stillwater's `Validation` type so that registering a malformed flow
//! reports every problem in one pass instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use backstack::core::FlowDefinition;
//! use backstack::validation::{flow_violations, FlowViolation};
//!
//! let broken = FlowDefinition::new("pay", ["Input", "Input"]);
//! assert_eq!(
//!     flow_violations(&broken),
//!     [FlowViolation::DuplicateStep { flow: "pay".into(), step: "Input".into() }]
//! );
//! ```

pub mod rules;
pub mod violations;

pub use rules::{flow_violations, validate_flow};
pub use violations::FlowViolation;
