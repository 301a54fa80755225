//! Core navigation types and logic.
//!
//! This module contains the data structures the navigator composes:
//! - Navigation entries and their priorities
//! - The entry store with priority-aware back/forward decisions
//! - Flow definitions and the derived active-flow context
//! - The overlay stack
//!
//! Nothing here notifies, persists or logs; those concerns live in the
//! navigator that owns these structures.

mod entry;
mod flow;
mod overlay;
mod store;

pub use entry::{NavigateOptions, NavigationEntry, Payload, Priority};
pub use flow::{resolve_active_flow, ActiveFlow, FlowDefinition, FlowRegistry, TransitionKind};
pub use overlay::{DismissCallback, DismissReason, Overlay, OverlayStack};
pub use store::EntryStore;
