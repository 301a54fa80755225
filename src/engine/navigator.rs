//! The navigator: one synchronous API over the entry store, the overlay
//! stack and the flow registry.
//!
//! Every mutating call persists (when storage is attached) and notifies
//! listeners before returning.

use crate::core::{
    resolve_active_flow, ActiveFlow, DismissReason, EntryStore, FlowDefinition, FlowRegistry,
    NavigateOptions, NavigationEntry, Overlay, OverlayStack, TransitionKind,
};
use crate::engine::config::{NavigatorConfig, NavigatorOptions};
use crate::engine::error::NavigationError;
use crate::observer::{self, Listener, ListenerRegistry, NavigationSnapshot, Subscription};
use crate::persistence::{Persistence, SnapshotStorage};
use crate::validation::flow_violations;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// What a back gesture did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackOutcome {
    /// The top overlay was dismissed; history untouched
    OverlayDismissed,
    /// Moved to the previous step of the active flow
    FlowStepBack,
    /// Left the first step of a flow, returning to its entry page
    FlowExited,
    /// Ordinary priority-aware back navigation
    Navigated,
    /// Back is refused here (main page, or first flow step without an
    /// entry page); nothing changed
    Blocked,
    /// Nowhere to go back to; the host may close itself
    Unhandled,
}

impl BackOutcome {
    pub fn is_handled(self) -> bool {
        !matches!(self, Self::Unhandled)
    }

    /// Whether the current history entry changed.
    pub fn moved_history(self) -> bool {
        matches!(self, Self::FlowStepBack | Self::FlowExited | Self::Navigated)
    }
}

/// Logical navigation engine.
///
/// Construct with [`Navigator::new`] (or [`Navigator::with_storage`] to
/// persist history), then call [`Navigator::setup`] once before any
/// mutating operation.
///
/// The navigator is not internally synchronized. Hosts that touch it from
/// several threads must serialize access, e.g. with a `Mutex<Navigator>`.
///
/// # Example
///
/// ```rust
/// use backstack::core::FlowDefinition;
/// use backstack::engine::{BackOutcome, Navigator, NavigatorConfig, NavigatorOptions};
///
/// let mut nav = Navigator::new(NavigatorOptions::default());
/// let config = NavigatorConfig::new("Home")
///     .with_flow(FlowDefinition::new("pay", ["Input", "Confirm"]));
/// nav.setup(config, None).unwrap();
///
/// nav.navigate_to("Input").unwrap();
/// assert_eq!(nav.active_flow().unwrap().entry_page.as_deref(), Some("Home"));
///
/// assert_eq!(nav.handle_back().unwrap(), BackOutcome::FlowExited);
/// assert_eq!(nav.handle_back().unwrap(), BackOutcome::Blocked);
/// assert_eq!(nav.current_page(), Some("Home"));
/// ```
pub struct Navigator {
    options: NavigatorOptions,
    store: EntryStore,
    overlays: OverlayStack,
    flows: FlowRegistry,
    active_flow: Option<ActiveFlow>,
    main_page: Option<String>,
    listeners: ListenerRegistry,
    persistence: Option<Persistence>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavigatorOptions::default())
    }
}

impl Navigator {
    /// Create a navigator with empty, unpersisted history.
    pub fn new(options: NavigatorOptions) -> Self {
        Self {
            options,
            store: EntryStore::new(),
            overlays: OverlayStack::new(),
            flows: FlowRegistry::new(),
            active_flow: None,
            main_page: None,
            listeners: ListenerRegistry::new(),
            persistence: None,
        }
    }

    /// Create a navigator that restores history from `storage` and saves
    /// it back after every history change.
    ///
    /// Missing or unreadable snapshots yield an empty history.
    pub fn with_storage(options: NavigatorOptions, storage: Box<dyn SnapshotStorage>) -> Self {
        let persistence = Persistence::new(storage, options.storage_key.clone());
        let store = persistence.restore();
        Self {
            store,
            persistence: Some(persistence),
            ..Self::new(options)
        }
    }

    /// One-time initialization with the main page and initial flows.
    ///
    /// An empty history starts at `initial_page` (or the main page). A
    /// restored, non-empty history is kept; `initial_page` is pushed on top
    /// only if it differs from the restored current page.
    pub fn setup(
        &mut self,
        config: NavigatorConfig,
        initial_page: Option<&str>,
    ) -> Result<(), NavigationError> {
        if self.is_initialized() {
            return Err(NavigationError::AlreadyInitialized);
        }
        for flow in &config.flows {
            check_flow(flow)?;
        }
        for flow in config.flows {
            self.flows.register(flow);
        }

        let start = initial_page.unwrap_or(config.main_page.as_str()).to_string();
        let needs_start = match self.store.current() {
            None => true,
            Some(current) => initial_page.is_some() && current.page_id != start,
        };
        self.main_page = Some(config.main_page);

        if needs_start {
            let entry = self.build_entry(&start, NavigateOptions::push());
            self.store.push(entry);
            self.persist();
        }
        self.refresh_flow(None, TransitionKind::Restore);

        info!(
            main_page = self.main_page.as_deref().unwrap_or_default(),
            current = self.current_page().unwrap_or_default(),
            entries = self.store.len(),
            flows = self.flows.len(),
            "Navigator set up"
        );
        self.publish();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.main_page.is_some()
    }

    pub fn main_page(&self) -> Option<&str> {
        self.main_page.as_deref()
    }

    /// Register a listener. It is called immediately with the current
    /// snapshot, then after every state change.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where
        L: Listener + 'static,
    {
        let listener: Arc<dyn Listener> = Arc::new(listener);
        observer::deliver(listener.as_ref(), &self.state());
        self.listeners.register(listener)
    }

    /// Navigate to `page_id`.
    ///
    /// Returns the entry that was pushed, replaced in, or (for
    /// `skip_history`) only announced to listeners.
    pub fn navigate(
        &mut self,
        page_id: &str,
        options: NavigateOptions,
    ) -> Result<NavigationEntry, NavigationError> {
        self.ensure_ready("navigate")?;
        let replace = options.replace;
        let skip_history = options.skip_history;
        let entry = self.build_entry(page_id, options);

        if skip_history {
            debug!(page = %page_id, "Transient navigation, history untouched");
            self.publish_snapshot(self.snapshot(Some(entry.clone())));
            return Ok(entry);
        }

        let previous_page = self.current_page().map(str::to_owned);
        let kind = if replace && !self.store.is_empty() {
            self.store.replace(entry.clone());
            TransitionKind::Replace
        } else {
            self.store.push(entry.clone());
            TransitionKind::Push
        };
        debug!(
            page = %page_id,
            ?kind,
            index = ?self.store.current_index(),
            "Navigated"
        );
        self.commit(previous_page.as_deref(), kind);
        Ok(entry)
    }

    /// Push `page_id` with default options.
    pub fn navigate_to(&mut self, page_id: &str) -> Result<NavigationEntry, NavigationError> {
        self.navigate(page_id, NavigateOptions::push())
    }

    /// Priority-aware history back. Overlays and flows are not consulted;
    /// see [`Navigator::handle_back`] for the full back-gesture policy.
    pub fn back(&mut self) -> Result<bool, NavigationError> {
        self.ensure_ready("back")?;
        let previous_page = self.current_page().map(str::to_owned);
        if !self.store.back() {
            debug!("Back rejected, nowhere to go");
            return Ok(false);
        }
        self.commit(previous_page.as_deref(), TransitionKind::Back);
        Ok(true)
    }

    pub fn forward(&mut self) -> Result<bool, NavigationError> {
        self.ensure_ready("forward")?;
        let previous_page = self.current_page().map(str::to_owned);
        if !self.store.forward() {
            debug!("Forward rejected, already at the newest entry");
            return Ok(false);
        }
        self.commit(previous_page.as_deref(), TransitionKind::Forward);
        Ok(true)
    }

    /// Handle a back gesture.
    ///
    /// 1. An open overlay is dismissed, nothing else happens.
    /// 2. Inside the active flow, back moves one step; from the first step
    ///    it returns to the entry page, or is blocked if there is none.
    /// 3. On the main page back is blocked.
    /// 4. Otherwise ordinary priority-aware back navigation.
    pub fn handle_back(&mut self) -> Result<BackOutcome, NavigationError> {
        self.ensure_ready("handle_back")?;

        if let Some(mut overlay) = self.overlays.pop() {
            debug!(overlay = %overlay.id(), "Back dismissed overlay");
            if let Some(callback) = overlay.take_callback() {
                observer::isolate("overlay dismissal", || callback(DismissReason::Back));
            }
            self.publish();
            return Ok(BackOutcome::OverlayDismissed);
        }

        let previous_page = self.current_page().map(str::to_owned);
        if let Some(outcome) = self.flow_back(previous_page.as_deref()) {
            return Ok(outcome);
        }

        if previous_page.is_some() && previous_page.as_deref() == self.main_page() {
            debug!("Back blocked on main page");
            return Ok(BackOutcome::Blocked);
        }

        if !self.store.back() {
            debug!("Back unhandled, history exhausted");
            return Ok(BackOutcome::Unhandled);
        }
        self.commit(previous_page.as_deref(), TransitionKind::Back);
        Ok(BackOutcome::Navigated)
    }

    fn flow_back(&mut self, current_page: Option<&str>) -> Option<BackOutcome> {
        let active = self.active_flow.as_ref()?;
        if !active.contains(current_page?) {
            return None;
        }
        let flow = active.flow_name.clone();

        if !active.is_first_step() {
            if !self.store.step_back() {
                return Some(BackOutcome::Blocked);
            }
            self.commit(current_page, TransitionKind::Back);
            debug!(flow = %flow, "Stepped back within flow");
            return Some(BackOutcome::FlowStepBack);
        }

        // The whole run of this flow's entries is left, not just one entry.
        let target = active
            .entry_page
            .as_ref()
            .and_then(|_| self.store.run_start(|entry| active.contains(&entry.page_id)))
            .and_then(|start| start.checked_sub(1));
        let Some(target) = target else {
            debug!(flow = %flow, "Back blocked on first step, no entry page");
            return Some(BackOutcome::Blocked);
        };
        if !self.store.rewind_to(target) {
            return Some(BackOutcome::Blocked);
        }
        self.active_flow = None;
        self.commit(current_page, TransitionKind::Back);
        debug!(flow = %flow, "Exited flow to its entry page");
        Some(BackOutcome::FlowExited)
    }

    pub fn open_overlay(&mut self, overlay: Overlay) -> Result<(), NavigationError> {
        self.ensure_ready("open_overlay")?;
        debug!(overlay = %overlay.id(), depth = self.overlays.len() + 1, "Opened overlay");
        self.overlays.push(overlay);
        self.publish();
        Ok(())
    }

    /// Close the overlay with `id` wherever it is, or the top overlay when
    /// `id` is `None`. The dismissal callback is not invoked. Returns
    /// whether an overlay was closed.
    pub fn close_overlay(&mut self, id: Option<&str>) -> Result<bool, NavigationError> {
        self.ensure_ready("close_overlay")?;
        let closed = match id {
            Some(id) => self.overlays.remove(id),
            None => self.overlays.pop(),
        };
        if let Some(overlay) = &closed {
            debug!(overlay = %overlay.id(), "Closed overlay");
        }
        self.publish();
        Ok(closed.is_some())
    }

    /// Dismiss every overlay, topmost first, invoking each callback with
    /// [`DismissReason::Cleared`]. Returns how many were open.
    pub fn clear_overlays(&mut self) -> Result<usize, NavigationError> {
        self.ensure_ready("clear_overlays")?;
        let overlays = self.overlays.drain();
        let count = overlays.len();
        for mut overlay in overlays {
            if let Some(callback) = overlay.take_callback() {
                observer::isolate("overlay dismissal", || callback(DismissReason::Cleared));
            }
        }
        self.publish();
        Ok(count)
    }

    /// Register (or replace) a flow definition.
    pub fn register_flow(&mut self, flow: FlowDefinition) -> Result<(), NavigationError> {
        self.ensure_ready("register_flow")?;
        check_flow(&flow)?;
        debug!(flow = %flow.name, steps = flow.steps.len(), "Registered flow");
        self.flows.register(flow);

        let before = self.active_flow.clone();
        self.refresh_flow(None, TransitionKind::Restore);
        if self.active_flow != before {
            self.publish();
        }
        Ok(())
    }

    /// Push a step of a registered flow.
    ///
    /// Flows advance one step at a time: a flow that is not active must be
    /// entered at its first step, an active flow only accepts its next step.
    pub fn navigate_flow(
        &mut self,
        flow: &str,
        step: &str,
    ) -> Result<NavigationEntry, NavigationError> {
        self.ensure_ready("navigate_flow")?;
        let definition = self
            .flows
            .get(flow)
            .ok_or_else(|| NavigationError::UnknownFlow {
                name: flow.to_string(),
            })?;
        let position = definition
            .position(step)
            .ok_or_else(|| NavigationError::UnknownStep {
                flow: flow.to_string(),
                step: step.to_string(),
            })?;

        let expected = match self.active_flow.as_ref() {
            Some(active) if active.flow_name == flow => active.step_index + 1,
            _ => 0,
        };
        if position != expected {
            return Err(match definition.step(expected) {
                Some(expected) => NavigationError::StepOutOfOrder {
                    flow: flow.to_string(),
                    expected: expected.to_string(),
                    found: step.to_string(),
                },
                None => NavigationError::FlowComplete {
                    flow: flow.to_string(),
                },
            });
        }

        self.navigate(step, NavigateOptions::push().in_flow(flow))
    }

    /// Push the next step of the active flow. Returns `false` at the last
    /// step.
    pub fn next_step(&mut self) -> Result<bool, NavigationError> {
        self.ensure_ready("next_step")?;
        let active = self
            .active_flow
            .as_ref()
            .ok_or(NavigationError::NoActiveFlow)?;
        let Some(next) = active.next_step().map(str::to_owned) else {
            return Ok(false);
        };
        let flow = active.flow_name.clone();

        self.navigate_flow(&flow, &next)?;
        Ok(true)
    }

    /// Rewind the active flow (or the named flow, if it is the active one)
    /// to its first step.
    ///
    /// Entries of the flow are popped off the top of history and the first
    /// step is pushed back on. The entry page is preserved so the first step
    /// can still be backed out of. Returns `false` if no matching flow is
    /// active.
    pub fn exit_flow(&mut self, flow: Option<&str>) -> Result<bool, NavigationError> {
        self.ensure_ready("exit_flow")?;
        let Some(active) = self.active_flow.clone() else {
            return Ok(false);
        };
        if flow.is_some_and(|name| name != active.flow_name) {
            return Ok(false);
        }
        let Some(first_step) = active.steps.first().cloned() else {
            return Ok(false);
        };

        let popped = self.store.pop_while(|entry| active.contains(&entry.page_id));
        let restored = popped
            .into_iter()
            .last()
            .filter(|entry| entry.page_id == first_step)
            .unwrap_or_else(|| {
                self.build_entry(
                    &first_step,
                    NavigateOptions::push().in_flow(active.flow_name.clone()),
                )
            });
        self.store.push(restored);

        debug!(flow = %active.flow_name, "Rewound flow to its first step");
        self.active_flow = Some(ActiveFlow {
            step_index: 0,
            ..active
        });
        self.persist();
        self.publish();
        Ok(true)
    }

    /// Remove every history entry tagged with `flow_id`. Returns how many
    /// were removed.
    pub fn remove_flow_entries(&mut self, flow_id: &str) -> Result<usize, NavigationError> {
        self.ensure_ready("remove_flow_entries")?;
        let removed = self.store.remove_flow(flow_id);
        if removed > 0 {
            debug!(flow = %flow_id, removed, "Removed flow entries from history");
            self.refresh_flow(None, TransitionKind::Restore);
            self.persist();
            self.publish();
        }
        Ok(removed)
    }

    pub fn clear_history(&mut self) -> Result<(), NavigationError> {
        self.ensure_ready("clear_history")?;
        self.store.clear();
        self.active_flow = None;
        debug!("Cleared history");
        self.persist();
        self.publish();
        Ok(())
    }

    /// Snapshot of the complete navigator state.
    pub fn state(&self) -> NavigationSnapshot {
        self.snapshot(None)
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.store.current()
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current().map(|entry| entry.page_id.as_str())
    }

    pub fn history(&self) -> &[NavigationEntry] {
        self.store.entries()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.store.current_index()
    }

    pub fn active_flow(&self) -> Option<&ActiveFlow> {
        self.active_flow.as_ref()
    }

    pub fn flows(&self) -> &FlowRegistry {
        &self.flows
    }

    /// Open overlay ids, bottom to top.
    pub fn overlay_ids(&self) -> Vec<String> {
        self.overlays.ids()
    }

    /// Whether [`Navigator::back`] would move.
    pub fn can_go_back(&self) -> bool {
        self.store.back_target().is_some()
    }

    /// Whether [`Navigator::forward`] would move.
    pub fn can_go_forward(&self) -> bool {
        self.store.forward_target().is_some()
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<(), NavigationError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(NavigationError::NotInitialized { operation })
        }
    }

    fn build_entry(&self, page_id: &str, options: NavigateOptions) -> NavigationEntry {
        let priority = options.priority.unwrap_or(self.options.default_priority);
        let flow_id = options.flow_id.or_else(|| {
            let preferred = self.active_flow.as_ref().map(|f| f.flow_name.as_str());
            self.flows
                .flow_for_page(page_id, preferred)
                .map(|f| f.name.clone())
        });
        NavigationEntry {
            payload: options.payload,
            flow_id,
            ..NavigationEntry::new(page_id, priority)
        }
    }

    fn commit(&mut self, previous_page: Option<&str>, kind: TransitionKind) {
        self.refresh_flow(previous_page, kind);
        self.persist();
        self.publish();
    }

    fn refresh_flow(&mut self, previous_page: Option<&str>, kind: TransitionKind) {
        self.active_flow = resolve_active_flow(
            &self.store,
            previous_page,
            &self.flows,
            self.active_flow.as_ref(),
            kind,
        );
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            persistence.save_quietly(&self.store);
        }
    }

    fn snapshot(&self, transient: Option<NavigationEntry>) -> NavigationSnapshot {
        let is_transient = transient.is_some();
        NavigationSnapshot {
            current: transient.or_else(|| self.store.current().cloned()),
            current_index: self.store.current_index(),
            history: self.store.entries().to_vec(),
            overlays: self.overlays.ids(),
            active_flow: self.active_flow.clone(),
            can_go_back: self.can_go_back(),
            can_go_forward: self.can_go_forward(),
            transient: is_transient,
        }
    }

    fn publish(&self) {
        if !self.listeners.is_empty() {
            self.publish_snapshot(self.snapshot(None));
        }
    }

    fn publish_snapshot(&self, snapshot: NavigationSnapshot) {
        self.listeners.notify(&snapshot);
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("main_page", &self.main_page)
            .field("store", &self.store)
            .field("overlays", &self.overlays)
            .field("active_flow", &self.active_flow)
            .field("listeners", &self.listeners)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

fn check_flow(flow: &FlowDefinition) -> Result<(), NavigationError> {
    let violations = flow_violations(flow);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(NavigationError::InvalidFlow {
            name: flow.name.clone(),
            violations,
        })
    }
}
