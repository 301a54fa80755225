//! Flow definitions and the derived active-flow context.
//!
//! A flow is a named, ordered sequence of steps. Which flow (if any) the user
//! currently occupies is never stored independently: it is recomputed from
//! the entry store after every change of location by
//! [`resolve_active_flow`], so it cannot drift from the history after
//! arbitrary back/forward jumps.

use super::store::EntryStore;
use serde::{Deserialize, Serialize};

/// Named, ordered list of step identifiers.
///
/// # Example
///
/// ```rust
/// use backstack::core::FlowDefinition;
///
/// let pay = FlowDefinition::new("pay", ["Input", "Detail", "Confirm"]);
/// assert_eq!(pay.position("Detail"), Some(1));
/// assert_eq!(pay.first_step(), Some("Input"));
/// assert!(!pay.contains("Home"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub name: String,
    pub steps: Vec<String>,
}

impl FlowDefinition {
    pub fn new<I, S>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    pub fn position(&self, page_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step == page_id)
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.position(page_id).is_some()
    }

    pub fn step(&self, index: usize) -> Option<&str> {
        self.steps.get(index).map(String::as_str)
    }

    pub fn first_step(&self) -> Option<&str> {
        self.step(0)
    }
}

/// Registered flows, in registration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowRegistry {
    flows: Vec<FlowDefinition>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing (in place) any flow with the same name.
    /// Returns the replaced definition.
    pub fn register(&mut self, definition: FlowDefinition) -> Option<FlowDefinition> {
        match self.flows.iter_mut().find(|f| f.name == definition.name) {
            Some(existing) => Some(std::mem::replace(existing, definition)),
            None => {
                self.flows.push(definition);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FlowDefinition> {
        self.flows.iter().find(|f| f.name == name)
    }

    /// Find the flow a page belongs to.
    ///
    /// When several flows share the page, `preferred` wins if it is one of
    /// them; otherwise the earliest registered flow does.
    pub fn flow_for_page(&self, page_id: &str, preferred: Option<&str>) -> Option<&FlowDefinition> {
        preferred
            .and_then(|name| self.get(name))
            .filter(|flow| flow.contains(page_id))
            .or_else(|| self.flows.iter().find(|flow| flow.contains(page_id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlowDefinition> {
        self.flows.iter()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// How the current location was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Push,
    Forward,
    Back,
    Replace,
    /// Restored from persistence, set up, or history rewritten in place
    Restore,
}

/// The flow the user currently occupies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFlow {
    pub flow_name: String,
    pub steps: Vec<String>,
    pub step_index: usize,
    /// Page occupied before the flow was entered by forward navigation
    pub entry_page: Option<String>,
}

impl ActiveFlow {
    pub fn current_step(&self) -> Option<&str> {
        self.steps.get(self.step_index).map(String::as_str)
    }

    pub fn next_step(&self) -> Option<&str> {
        self.steps.get(self.step_index + 1).map(String::as_str)
    }

    pub fn is_first_step(&self) -> bool {
        self.step_index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index + 1 >= self.steps.len()
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.steps.iter().any(|step| step == page_id)
    }
}

/// Recompute the active flow after the current location changed.
///
/// - Current page outside every flow: `None`.
/// - Same flow as before: step index follows the page, entry page is kept.
/// - New or different flow reached by push/forward: entry page is the page
///   navigated from, if it lies outside the flow.
/// - New or different flow reached by back: entry page is the entry just
///   below the flow's contiguous run of entries in history.
/// - Replace and restore record no entry page.
///
/// The entry's own flow tag takes precedence over page membership.
pub fn resolve_active_flow(
    store: &EntryStore,
    previous_page: Option<&str>,
    registry: &FlowRegistry,
    previous: Option<&ActiveFlow>,
    kind: TransitionKind,
) -> Option<ActiveFlow> {
    let entry = store.current()?;
    let page = entry.page_id.as_str();
    let preferred = previous.map(|flow| flow.flow_name.as_str());

    let definition = entry
        .flow_id
        .as_deref()
        .and_then(|id| registry.get(id))
        .filter(|flow| flow.contains(page))
        .or_else(|| registry.flow_for_page(page, preferred))?;
    let step_index = definition.position(page)?;

    let entry_page = match previous {
        Some(active) if active.flow_name == definition.name => active.entry_page.clone(),
        _ => match kind {
            TransitionKind::Push | TransitionKind::Forward => previous_page
                .filter(|from| !definition.contains(from))
                .map(str::to_owned),
            TransitionKind::Back => store
                .run_start(|entry| definition.contains(&entry.page_id))
                .and_then(|start| start.checked_sub(1))
                .and_then(|below| store.entries().get(below))
                .map(|below| below.page_id.clone()),
            TransitionKind::Replace | TransitionKind::Restore => None,
        },
    };

    Some(ActiveFlow {
        flow_name: definition.name.clone(),
        steps: definition.steps.clone(),
        step_index,
        entry_page,
    })
}
