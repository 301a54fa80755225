//! Builder for constructing a ready-to-use navigator.

use crate::builder::error::BuildError;
use crate::core::{FlowDefinition, Priority};
use crate::engine::{Navigator, NavigatorConfig, NavigatorOptions};
use crate::persistence::SnapshotStorage;

/// Fluent builder that creates a [`Navigator`] and runs its setup.
#[derive(Default)]
pub struct NavigatorBuilder {
    main_page: Option<String>,
    initial_page: Option<String>,
    flows: Vec<FlowDefinition>,
    options: NavigatorOptions,
    storage: Option<Box<dyn SnapshotStorage>>,
}

impl NavigatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the main page (required).
    pub fn main_page(mut self, page_id: impl Into<String>) -> Self {
        self.main_page = Some(page_id.into());
        self
    }

    /// Start somewhere other than the main page.
    pub fn initial_page(mut self, page_id: impl Into<String>) -> Self {
        self.initial_page = Some(page_id.into());
        self
    }

    pub fn flow(mut self, flow: FlowDefinition) -> Self {
        self.flows.push(flow);
        self
    }

    pub fn flows(mut self, flows: impl IntoIterator<Item = FlowDefinition>) -> Self {
        self.flows.extend(flows);
        self
    }

    pub fn default_priority(mut self, priority: Priority) -> Self {
        self.options.default_priority = priority;
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.options.storage_key = key.into();
        self
    }

    /// Persist history to `storage`, restoring whatever it holds.
    pub fn storage(mut self, storage: impl SnapshotStorage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Build and set up the navigator.
    pub fn build(self) -> Result<Navigator, BuildError> {
        let main_page = self.main_page.ok_or(BuildError::MissingMainPage)?;

        let mut navigator = match self.storage {
            Some(storage) => Navigator::with_storage(self.options, storage),
            None => Navigator::new(self.options),
        };
        let config = NavigatorConfig {
            main_page,
            flows: self.flows,
        };
        navigator.setup(config, self.initial_page.as_deref())?;
        Ok(navigator)
    }
}

impl std::fmt::Debug for NavigatorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigatorBuilder")
            .field("main_page", &self.main_page)
            .field("initial_page", &self.initial_page)
            .field("flows", &self.flows)
            .field("options", &self.options)
            .field("storage", &self.storage.is_some())
            .finish()
    }
}
