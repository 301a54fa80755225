//! Backstack: a logical navigation engine for single-page hosts
//!
//! Backstack keeps its own navigation history, independent of (but
//! synchronizable with) a browser's URL stack. It is built around a small
//! synchronous core: every operation updates plain data structures, then
//! persists and notifies.
//!
//! # Core Concepts
//!
//! - **Entries**: history records with a priority that shapes back navigation
//! - **Overlays**: transient layers dismissed by back before history moves
//! - **Flows**: ordered multi-page sequences with an entry page to return to
//! - **Listeners**: observers receiving a snapshot after every change
//! - **Persistence**: history survives restarts through pluggable storage
//!
//! # Example
//!
//! ```rust
//! use backstack::builder::NavigatorBuilder;
//! use backstack::core::{NavigateOptions, Priority};
//! use backstack::engine::BackOutcome;
//! use backstack::flow;
//!
//! let mut nav = NavigatorBuilder::new()
//!     .main_page("Home")
//!     .flow(flow!("pay" => ["Input", "Detail", "Confirm"]))
//!     .build()
//!     .unwrap();
//!
//! nav.navigate_to("List").unwrap();
//! for sheet in ["Filter", "Sort"] {
//!     nav.navigate(sheet, NavigateOptions::push().with_priority(Priority::Popup))
//!         .unwrap();
//! }
//!
//! // Stacked popups close together in one back press.
//! assert_eq!(nav.handle_back().unwrap(), BackOutcome::Navigated);
//! assert_eq!(nav.current_page(), Some("List"));
//!
//! // Flows remember where they were entered from.
//! nav.navigate_to("Input").unwrap();
//! assert_eq!(nav.handle_back().unwrap(), BackOutcome::FlowExited);
//! assert_eq!(nav.current_page(), Some("List"));
//! ```

pub mod builder;
pub mod core;
pub mod engine;
pub mod observer;
pub mod persistence;
pub mod router;
pub mod validation;

// Re-export commonly used types
pub use core::{NavigateOptions, NavigationEntry, Overlay, Priority};
pub use engine::{BackOutcome, NavigationError, Navigator};
pub use observer::{Listener, NavigationSnapshot, Subscription};
