//! Navigator configuration.

use crate::core::{FlowDefinition, Priority};
use crate::persistence::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};

/// Construction-time options.
///
/// Deserializable with defaults for every field, so a host can ship it as
/// JSON alongside its other settings.
///
/// # Example
///
/// ```rust
/// use backstack::core::Priority;
/// use backstack::engine::NavigatorOptions;
///
/// let options: NavigatorOptions =
///     serde_json::from_str(r#"{ "defaultPriority": "popup" }"#).unwrap();
/// assert_eq!(options.default_priority, Priority::Popup);
/// assert_eq!(options.storage_key, "navigation_history");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigatorOptions {
    /// Priority used when a navigation does not specify one
    pub default_priority: Priority,
    /// Key the history snapshot is stored under, when storage is attached
    pub storage_key: String,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            default_priority: Priority::Normal,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// One-time setup: the root page and the flows known up front.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorConfig {
    /// Page below which back navigation is refused
    pub main_page: String,
    #[serde(default)]
    pub flows: Vec<FlowDefinition>,
}

impl NavigatorConfig {
    pub fn new(main_page: impl Into<String>) -> Self {
        Self {
            main_page: main_page.into(),
            flows: Vec::new(),
        }
    }

    pub fn with_flow(mut self, flow: FlowDefinition) -> Self {
        self.flows.push(flow);
        self
    }
}
