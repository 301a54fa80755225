//! Ordered history of navigation entries with a current position.
//!
//! The store follows browser-history semantics: pushing after moving back
//! discards the forward branch. Back traversal is priority aware, see
//! [`EntryStore::back_target`].

use super::entry::{NavigationEntry, Priority};

/// Ordered entries plus the index of the current one.
///
/// `current` is `Some(i)` with `i < len` whenever the store is non-empty and
/// `None` iff it is empty.
///
/// # Example
///
/// ```rust
/// use backstack::core::{EntryStore, NavigationEntry, Priority};
///
/// let mut store = EntryStore::new();
/// store.push(NavigationEntry::new("A", Priority::Normal));
/// store.push(NavigationEntry::new("B", Priority::Normal));
/// store.push(NavigationEntry::new("C", Priority::Normal));
///
/// assert!(store.back());
/// assert!(store.back());
/// store.push(NavigationEntry::new("D", Priority::Normal));
///
/// let pages: Vec<_> = store.entries().iter().map(|e| e.page_id.as_str()).collect();
/// assert_eq!(pages, ["A", "D"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryStore {
    entries: Vec<NavigationEntry>,
    current: Option<usize>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from raw parts.
    ///
    /// Returns `None` when the index violates the store invariant.
    pub fn from_parts(entries: Vec<NavigationEntry>, current: Option<usize>) -> Option<Self> {
        let valid = match current {
            None => entries.is_empty(),
            Some(index) => index < entries.len(),
        };
        valid.then_some(Self { entries, current })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&NavigationEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Append an entry, discarding everything after the current position.
    pub fn push(&mut self, entry: NavigationEntry) {
        self.truncate_forward();
        self.entries.push(entry);
        self.current = Some(self.entries.len() - 1);
    }

    /// Overwrite the current entry, returning the one it replaced.
    ///
    /// On an empty store the entry is pushed instead and `None` is returned.
    pub fn replace(&mut self, entry: NavigationEntry) -> Option<NavigationEntry> {
        match self.current.and_then(|index| self.entries.get_mut(index)) {
            Some(slot) => Some(std::mem::replace(slot, entry)),
            None => {
                self.push(entry);
                None
            }
        }
    }

    /// Index `back` would move to, or `None` if there is nowhere to go.
    ///
    /// - `Fullscreen`: one step back, unconditionally.
    /// - `Popup`: skip every contiguous popup below and land on the nearest
    ///   non-popup entry; `None` if only popups remain.
    /// - `Normal`: one step back.
    pub fn back_target(&self) -> Option<usize> {
        let index = self.current?;
        let entry = self.entries.get(index)?;
        match entry.priority {
            Priority::Normal | Priority::Fullscreen => index.checked_sub(1),
            Priority::Popup => self.entries[..index]
                .iter()
                .rposition(|candidate| candidate.priority != Priority::Popup),
        }
    }

    /// Index `forward` would move to, or `None` at the tail.
    pub fn forward_target(&self) -> Option<usize> {
        let next = self.current? + 1;
        (next < self.entries.len()).then_some(next)
    }

    /// Priority-aware step back. Returns `false` without mutating when
    /// there is nowhere to go.
    pub fn back(&mut self) -> bool {
        self.move_to(self.back_target())
    }

    pub fn forward(&mut self) -> bool {
        self.move_to(self.forward_target())
    }

    /// Move exactly one entry back, ignoring priorities.
    pub fn step_back(&mut self) -> bool {
        let target = self.current.and_then(|index| index.checked_sub(1));
        self.move_to(target)
    }

    /// Remove every entry, resetting the index to the empty sentinel.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Drop every entry tagged with `flow_id`. Returns the number of entries
    /// removed.
    ///
    /// A surviving current entry stays current. A removed current entry
    /// hands over to the nearest surviving entry below it, or to the new
    /// bottom entry when nothing survives below.
    pub fn remove_flow(&mut self, flow_id: &str) -> usize {
        let Some(current) = self.current else {
            return 0;
        };
        let current_removed = self.entries[current].belongs_to(flow_id);
        let kept_below = self.entries[..current]
            .iter()
            .filter(|entry| !entry.belongs_to(flow_id))
            .count();

        let before = self.entries.len();
        self.entries.retain(|entry| !entry.belongs_to(flow_id));
        let removed = before - self.entries.len();

        self.current = if self.entries.is_empty() {
            None
        } else if current_removed {
            Some(kept_below.saturating_sub(1))
        } else {
            Some(kept_below)
        };
        removed
    }

    /// Lowest index of the contiguous run of entries matching `predicate`
    /// that ends at the current entry. `None` when the current entry does
    /// not match.
    pub fn run_start<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&NavigationEntry) -> bool,
    {
        let current = self.current?;
        if !predicate(&self.entries[current]) {
            return None;
        }
        let below = self.entries[..current]
            .iter()
            .rposition(|entry| !predicate(entry));
        Some(below.map_or(0, |index| index + 1))
    }

    /// Move back to `index`, which must lie below the current entry.
    pub fn rewind_to(&mut self, index: usize) -> bool {
        match self.current {
            Some(current) if index < current => self.move_to(Some(index)),
            _ => false,
        }
    }

    /// Discard the forward branch, then pop entries off the top while they
    /// match `predicate`. Returns the popped entries, topmost first.
    pub fn pop_while<F>(&mut self, predicate: F) -> Vec<NavigationEntry>
    where
        F: Fn(&NavigationEntry) -> bool,
    {
        self.truncate_forward();
        let mut popped = Vec::new();
        while self.entries.last().is_some_and(&predicate) {
            if let Some(entry) = self.entries.pop() {
                popped.push(entry);
            }
        }
        self.current = self.entries.len().checked_sub(1);
        popped
    }

    fn truncate_forward(&mut self) {
        let keep = self.current.map_or(0, |index| index + 1);
        self.entries.truncate(keep);
    }

    fn move_to(&mut self, target: Option<usize>) -> bool {
        match target {
            Some(index) if index < self.entries.len() => {
                self.current = Some(index);
                true
            }
            _ => false,
        }
    }
}
