//! View plugin: owns the view manager for the lifetime of the stage.

use std::rc::Rc;

use stagehand_test_utils::{NullHost, PresentationHost};
use stagehand_views::{ManagerConfig, ViewLibrary, ViewManager};

use crate::plugin::Plugin;
use crate::resource::Resources;

/// Inserts a [`ViewManager`] with the initial libraries registered, and shuts
/// it down (closing and recycling every view) when the stage shuts down.
///
/// # Resources Provided
///
/// - `ViewManager`
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use stagehand::{StageBuilder, TimePlugin, ViewPlugin};
/// use stagehand::host::NullHost;
///
/// let stage = StageBuilder::new()
///     .add_plugin(TimePlugin)
///     .add_plugin(ViewPlugin::new(Rc::new(NullHost::new())))
///     .build();
///
/// assert!(stage.views().is_some());
/// ```
pub struct ViewPlugin {
    host: Rc<dyn PresentationHost>,
    config: ManagerConfig,
    libraries: Vec<ViewLibrary>,
}

impl ViewPlugin {
    pub fn new(host: Rc<dyn PresentationHost>) -> Self {
        Self {
            host,
            config: ManagerConfig::default(),
            libraries: Vec::new(),
        }
    }

    /// A plugin backed by a [`NullHost`].
    pub fn headless() -> Self {
        Self::new(Rc::new(NullHost::new()))
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Register `library` when the stage is built.
    pub fn with_library(mut self, library: ViewLibrary) -> Self {
        self.libraries.push(library);
        self
    }
}

impl Plugin for ViewPlugin {
    fn name(&self) -> &'static str {
        "ViewPlugin"
    }

    fn dependencies(&self) -> &[&'static str] {
        &["TimePlugin"]
    }

    fn build(&self, resources: &mut Resources) {
        let mut manager = ViewManager::new(Rc::clone(&self.host), self.config);
        for library in &self.libraries {
            manager.register_library(library);
        }
        resources.insert(manager);
        tracing::debug!(
            "ViewPlugin: Registered ViewManager with {} libraries",
            self.libraries.len()
        );
    }

    fn cleanup(&self, resources: &mut Resources) {
        if let Some(mut manager) = resources.remove::<ViewManager>() {
            manager.shutdown();
        }
    }
}
