//! Navigation entries and the options that create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arbitrary key-value data attached to an entry at navigation time.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Classification controlling how back navigation leaves an entry.
///
/// - `Normal`: one back press leaves the entry.
/// - `Popup`: a run of stacked popups is left in a single back press,
///   landing on the nearest non-popup entry below.
/// - `Fullscreen`: always dismissed by one back press, whatever lies beneath.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    Popup,
    Fullscreen,
}

/// One visited logical location.
///
/// # Example
///
/// ```rust
/// use backstack::core::{NavigationEntry, Priority};
///
/// let entry = NavigationEntry::new("Home", Priority::Normal);
/// assert_eq!(entry.page_id, "Home");
/// assert!(entry.flow_id.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEntry {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Opaque, application-defined page identifier
    pub page_id: String,
    /// Data attached when the entry was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    pub priority: Priority,
    /// When the entry was created
    pub timestamp: DateTime<Utc>,
    /// Name of the registered flow this entry belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
}

impl NavigationEntry {
    /// Create an entry with a fresh id and the current time.
    pub fn new(page_id: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            page_id: page_id.into(),
            payload: None,
            priority,
            timestamp: Utc::now(),
            flow_id: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_flow(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    /// Check whether this entry is tagged with the given flow.
    pub fn belongs_to(&self, flow_id: &str) -> bool {
        self.flow_id.as_deref() == Some(flow_id)
    }
}

/// Options for a single navigation.
///
/// The default is a plain push with the navigator's default priority.
///
/// # Example
///
/// ```rust
/// use backstack::core::{NavigateOptions, Priority};
///
/// let options = NavigateOptions::replacing().with_priority(Priority::Popup);
/// assert!(options.replace);
/// assert_eq!(options.priority, Some(Priority::Popup));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigateOptions {
    /// Overwrite the current entry instead of appending
    pub replace: bool,
    /// Falls back to the configured default when `None`
    pub priority: Option<Priority>,
    pub payload: Option<Payload>,
    /// Explicit flow tag; inferred from the flow registry when `None`
    pub flow_id: Option<String>,
    /// Notify observers without recording the entry
    pub skip_history: bool,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self::default()
    }

    pub fn replacing() -> Self {
        Self {
            replace: true,
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn in_flow(mut self, flow_id: impl Into<String>) -> Self {
        self.flow_id = Some(flow_id.into());
        self
    }

    /// Mark the navigation as transient: observers see it, history does not.
    pub fn transient(mut self) -> Self {
        self.skip_history = true;
        self
    }
}
