//! Keeps a browser-style URL history in step with the navigator.
//!
//! The navigator is the source of truth. [`RouterSync`] mirrors its current
//! page into a [`BrowserHistory`] and routes browser back gestures through
//! [`Navigator::handle_back`], restoring the visible URL when the navigator
//! refused to move.

use crate::engine::{BackOutcome, NavigationError, Navigator};
use crate::observer::NavigationSnapshot;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Bidirectional page id / path mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    paths: HashMap<String, String>,
    pages: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`RouteTable::insert`].
    pub fn route(mut self, page_id: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(page_id, path);
        self
    }

    /// Map `page_id` to `path`, dropping any previous mapping of either.
    pub fn insert(&mut self, page_id: impl Into<String>, path: impl Into<String>) {
        let page_id = page_id.into();
        let path = path.into();
        if let Some(old_path) = self.paths.remove(&page_id) {
            self.pages.remove(&old_path);
        }
        if let Some(old_page) = self.pages.remove(&path) {
            self.paths.remove(&old_page);
        }
        self.paths.insert(page_id.clone(), path.clone());
        self.pages.insert(path, page_id);
    }

    pub fn path_for(&self, page_id: &str) -> Option<&str> {
        self.paths.get(page_id).map(String::as_str)
    }

    pub fn page_for(&self, path: &str) -> Option<&str> {
        self.pages.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The host's URL history.
pub trait BrowserHistory {
    fn push(&mut self, path: &str);

    fn replace(&mut self, path: &str);

    /// Leave the current URL, letting the host handle it (e.g. close the
    /// WebView).
    fn go_back(&mut self);
}

/// What [`RouterSync::on_change`] did to the browser history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncAction {
    Pushed,
    Replaced,
    Unchanged,
    /// The current page has no route; the browser was left alone
    Unmapped,
}

/// Mirrors navigator state into a [`BrowserHistory`].
#[derive(Debug)]
pub struct RouterSync<B> {
    routes: RouteTable,
    browser: B,
    synced: Option<Synced>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Synced {
    page_id: String,
    index: Option<usize>,
}

impl<B: BrowserHistory> RouterSync<B> {
    pub fn new(routes: RouteTable, browser: B) -> Self {
        Self {
            routes,
            browser,
            synced: None,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Mirror a snapshot into the browser.
    ///
    /// Moving to a newer history index pushes; moving back, replacing in
    /// place or a transient navigation replaces.
    pub fn on_change(&mut self, snapshot: &NavigationSnapshot) -> SyncAction {
        let Some(page_id) = snapshot.current_page() else {
            return SyncAction::Unchanged;
        };
        let next = Synced {
            page_id: page_id.to_string(),
            index: snapshot.current_index,
        };
        if self.synced.as_ref() == Some(&next) && !snapshot.transient {
            return SyncAction::Unchanged;
        }
        let Some(path) = self.routes.path_for(page_id) else {
            warn!(page = %page_id, "No route for page, browser history not updated");
            return SyncAction::Unmapped;
        };

        let advanced = match (&self.synced, next.index) {
            (None, _) => true,
            (Some(previous), Some(index)) => previous.index.map_or(true, |prev| index > prev),
            (Some(_), None) => false,
        };
        let action = if advanced && !snapshot.transient {
            self.browser.push(path);
            SyncAction::Pushed
        } else {
            self.browser.replace(path);
            SyncAction::Replaced
        };
        debug!(page = %page_id, path = %path, ?action, "Synced browser history");

        if !snapshot.transient {
            self.synced = Some(next);
        }
        action
    }

    /// Handle a back gesture that arrived from the browser.
    ///
    /// The browser has already left the current URL. If the navigator moved,
    /// the URL is replaced with the new page's path; if it only dismissed an
    /// overlay or blocked, the current path is pushed back so the address
    /// bar still matches the visible page.
    pub fn on_browser_back(
        &mut self,
        navigator: &mut Navigator,
    ) -> Result<BackOutcome, NavigationError> {
        let outcome = navigator.handle_back()?;
        let snapshot = navigator.state();

        if outcome.moved_history() {
            self.on_change(&snapshot);
        } else if outcome.is_handled() {
            match snapshot.current_page().and_then(|page| self.routes.path_for(page)) {
                Some(path) => self.browser.push(path),
                None => warn!(?outcome, "No route to restore after handled back"),
            }
        }
        Ok(outcome)
    }

    /// Back requested from inside the app. If the navigator has nowhere to
    /// go, the browser is asked to go back instead.
    pub fn request_back(
        &mut self,
        navigator: &mut Navigator,
    ) -> Result<BackOutcome, NavigationError> {
        let outcome = navigator.handle_back()?;
        if outcome.is_handled() {
            self.on_change(&navigator.state());
        } else {
            debug!("Back unhandled, delegating to browser");
            self.browser.go_back();
        }
        Ok(outcome)
    }
}
