//! Dismissible UI layers that intercept back navigation.

use std::fmt;

/// Why an overlay's dismissal callback ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    /// Closed by a back gesture
    Back,
    /// Closed because every overlay was cleared at once
    Cleared,
}

/// Callback invoked once when an overlay is dismissed by the navigator.
pub type DismissCallback = Box<dyn FnOnce(DismissReason) + Send>;

/// A popup, sheet or dialog layered above the current page.
///
/// Overlays never appear in history; they are dismissed, not navigated away
/// from.
pub struct Overlay {
    id: String,
    on_dismiss: Option<DismissCallback>,
}

impl Overlay {
    /// An overlay without a dismissal callback.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_dismiss: None,
        }
    }

    pub fn with_dismiss<F>(id: impl Into<String>, on_dismiss: F) -> Self
    where
        F: FnOnce(DismissReason) + Send + 'static,
    {
        Self {
            id: id.into(),
            on_dismiss: Some(Box::new(on_dismiss)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Take the callback out, leaving the overlay inert.
    pub(crate) fn take_callback(&mut self) -> Option<DismissCallback> {
        self.on_dismiss.take()
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("id", &self.id)
            .field("has_callback", &self.on_dismiss.is_some())
            .finish()
    }
}

/// LIFO stack of open overlays.
#[derive(Debug, Default)]
pub struct OverlayStack {
    overlays: Vec<Overlay>,
}

impl OverlayStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    pub fn pop(&mut self) -> Option<Overlay> {
        self.overlays.pop()
    }

    /// Remove the topmost overlay with `id`, wherever it sits in the stack.
    pub fn remove(&mut self, id: &str) -> Option<Overlay> {
        let index = self.overlays.iter().rposition(|overlay| overlay.id == id)?;
        Some(self.overlays.remove(index))
    }

    pub fn top(&self) -> Option<&Overlay> {
        self.overlays.last()
    }

    /// Remove every overlay, topmost first.
    pub fn drain(&mut self) -> Vec<Overlay> {
        let mut drained: Vec<Overlay> = self.overlays.drain(..).collect();
        drained.reverse();
        drained
    }

    /// Overlay ids, bottom to top.
    pub fn ids(&self) -> Vec<String> {
        self.overlays.iter().map(|overlay| overlay.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn pop_is_lifo() {
        let mut stack = OverlayStack::new();
        stack.push(Overlay::new("sheet"));
        stack.push(Overlay::new("dialog"));

        assert_eq!(stack.top().unwrap().id(), "dialog");
        assert_eq!(stack.pop().unwrap().id(), "dialog");
        assert_eq!(stack.pop().unwrap().id(), "sheet");
        assert!(stack.pop().is_none());
    }

    #[test]
    fn remove_targets_any_position() {
        let mut stack = OverlayStack::new();
        stack.push(Overlay::new("a"));
        stack.push(Overlay::new("b"));
        stack.push(Overlay::new("c"));

        assert_eq!(stack.remove("b").unwrap().id(), "b");
        assert_eq!(stack.ids(), ["a", "c"]);
        assert!(stack.remove("missing").is_none());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn drain_returns_topmost_first() {
        let mut stack = OverlayStack::new();
        stack.push(Overlay::new("a"));
        stack.push(Overlay::new("b"));

        let drained: Vec<_> = stack.drain().into_iter().map(|o| o.id).collect();

        assert_eq!(drained, ["b", "a"]);
        assert!(stack.is_empty());
    }

    #[test]
    fn callback_can_be_taken_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut overlay = Overlay::with_dismiss("sheet", move |reason| {
            sink.lock().unwrap().push(reason);
        });

        let callback = overlay.take_callback().unwrap();
        callback(DismissReason::Back);

        assert!(overlay.take_callback().is_none());
        assert_eq!(*seen.lock().unwrap(), [DismissReason::Back]);
    }
}
