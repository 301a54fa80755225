//! The navigation engine.
//!
//! [`Navigator`] owns the entry store, overlay stack, flow registry and
//! listener set, and applies the back-handling policy across them.

pub mod config;
pub mod error;
pub mod navigator;

pub use config::{NavigatorConfig, NavigatorOptions};
pub use error::NavigationError;
pub use navigator::{BackOutcome, Navigator};
