//! Notification channel between the navigator and its adapters.
//!
//! Listeners receive an immutable [`NavigationSnapshot`] synchronously after
//! every state change. A panicking listener is caught and logged; the other
//! listeners still receive the same snapshot and the navigator's state is
//! unaffected.

use crate::core::{ActiveFlow, NavigationEntry};
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Immutable view of navigator state delivered to listeners.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    /// Current entry, or the transient entry of a skip-history navigation
    pub current: Option<NavigationEntry>,
    pub current_index: Option<usize>,
    pub history: Vec<NavigationEntry>,
    /// Open overlay ids, bottom to top
    pub overlays: Vec<String>,
    pub active_flow: Option<ActiveFlow>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// `current` was not recorded in history
    pub transient: bool,
}

impl NavigationSnapshot {
    pub fn current_page(&self) -> Option<&str> {
        self.current.as_ref().map(|entry| entry.page_id.as_str())
    }
}

/// Receives navigator snapshots.
///
/// Implemented for every `Fn(&NavigationSnapshot) + Send + Sync` closure.
pub trait Listener: Send + Sync {
    fn on_change(&self, snapshot: &NavigationSnapshot);
}

impl<F> Listener for F
where
    F: Fn(&NavigationSnapshot) + Send + Sync,
{
    fn on_change(&self, snapshot: &NavigationSnapshot) {
        self(snapshot)
    }
}

/// Identifier of a registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Slots {
    next_id: u64,
    listeners: HashMap<SubscriptionId, Arc<dyn Listener>>,
}

/// Set of listeners, shared with the [`Subscription`] handles it hands out.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, listener: Arc<dyn Listener>) -> Subscription {
        let mut slots = self.lock();
        let id = SubscriptionId(slots.next_id);
        slots.next_id += 1;
        slots.listeners.insert(id, listener);

        Subscription {
            id,
            slots: Arc::downgrade(&self.slots),
        }
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        self.lock().listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().listeners.is_empty()
    }

    /// Deliver a snapshot to every listener. Returns how many listeners
    /// completed without panicking.
    ///
    /// The listener set is copied before delivery, so listeners may
    /// unsubscribe (themselves or others) while being notified.
    pub fn notify(&self, snapshot: &NavigationSnapshot) -> usize {
        let listeners: Vec<Arc<dyn Listener>> = self.lock().listeners.values().cloned().collect();
        listeners
            .iter()
            .filter(|listener| deliver(listener.as_ref(), snapshot))
            .count()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to detach it.
pub struct Subscription {
    id: SubscriptionId,
    slots: Weak<Mutex<Slots>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Detach the listener. Idempotent; returns `true` only on the call that
    /// actually removed it.
    pub fn unsubscribe(&self) -> bool {
        let Some(slots) = self.slots.upgrade() else {
            return false;
        };
        let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.listeners.remove(&self.id).is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Deliver one snapshot to one listener, isolating panics.
pub(crate) fn deliver(listener: &dyn Listener, snapshot: &NavigationSnapshot) -> bool {
    isolate("listener", || listener.on_change(snapshot))
}

/// Run a caller-supplied callback, catching and logging a panic.
pub(crate) fn isolate<F: FnOnce()>(callback: &'static str, f: F) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(cause) => {
            tracing::error!(
                callback,
                message = %panic_message(cause.as_ref()),
                "Callback panicked, continuing"
            );
            false
        }
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn empty_snapshot() -> NavigationSnapshot {
        NavigationSnapshot {
            current: None,
            current_index: None,
            history: Vec::new(),
            overlays: Vec::new(),
            active_flow: None,
            can_go_back: false,
            can_go_forward: false,
            transient: false,
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Arc<dyn Listener>) {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        let listener: Arc<dyn Listener> = Arc::new(move |_: &NavigationSnapshot| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        (count, listener)
    }

    #[test]
    fn notify_reaches_every_listener() {
        let registry = ListenerRegistry::new();
        let (first, listener) = counter();
        registry.register(listener);
        let (second, listener) = counter();
        registry.register(listener);

        assert_eq!(registry.notify(&empty_snapshot()), 2);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let registry = ListenerRegistry::new();
        let (count, listener) = counter();
        let subscription = registry.register(listener);

        assert!(subscription.unsubscribe());
        assert!(!subscription.unsubscribe());
        assert!(!registry.remove(subscription.id()));

        registry.notify(&empty_snapshot());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let registry = ListenerRegistry::new();
        registry.register(Arc::new(|_: &NavigationSnapshot| panic!("listener failure")));
        let (count, listener) = counter();
        registry.register(listener);

        let delivered = registry.notify(&empty_snapshot());

        assert_eq!(delivered, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unsubscribe_after_registry_dropped_is_noop() {
        let registry = ListenerRegistry::new();
        let (_, listener) = counter();
        let subscription = registry.register(listener);
        drop(registry);

        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn subscription_ids_are_distinct() {
        let registry = ListenerRegistry::new();
        let (_, a) = counter();
        let (_, b) = counter();

        assert_ne!(registry.register(a).id(), registry.register(b).id());
    }

    #[test]
    fn panic_message_extracts_text() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("boom"));
        let borrowed: Box<dyn Any + Send> = Box::new("bang");

        assert_eq!(panic_message(owned.as_ref()), "boom");
        assert_eq!(panic_message(borrowed.as_ref()), "bang");
    }
}
