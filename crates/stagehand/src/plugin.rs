//! Plugin system for assembling a stage.
//!
//! Plugins insert resources when the stage is built and tear them down again
//! when it shuts down.

use crate::resource::Resources;

/// A building block of the stage.
///
/// # Example
///
/// ```
/// use stagehand::{Plugin, Resources};
///
/// struct ThemePlugin;
///
/// impl Plugin for ThemePlugin {
///     fn name(&self) -> &'static str {
///         "ThemePlugin"
///     }
///
///     fn build(&self, resources: &mut Resources) {
///         resources.insert(0xff8800u32);
///     }
/// }
/// ```
pub trait Plugin: 'static {
    /// Unique name of this plugin.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Names of plugins that must be built first.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Called when the stage is built. Register resources here.
    fn build(&self, resources: &mut Resources);

    /// Called after every plugin has been built.
    #[allow(unused_variables)]
    fn finish(&self, resources: &mut Resources) {}

    /// Called when the stage shuts down, in reverse build order.
    #[allow(unused_variables)]
    fn cleanup(&self, resources: &mut Resources) {}
}

/// A function-based plugin for simple setup.
///
/// ```
/// use stagehand::{FnPlugin, StageBuilder};
///
/// let stage = StageBuilder::new()
///     .add_plugin(FnPlugin::new("title", |resources| {
///         resources.insert("Main Menu".to_string());
///     }))
///     .build();
///
/// assert_eq!(stage.get::<String>().map(String::as_str), Some("Main Menu"));
/// ```
pub struct FnPlugin<F>
where
    F: Fn(&mut Resources) + 'static,
{
    name: &'static str,
    build_fn: F,
}

impl<F> FnPlugin<F>
where
    F: Fn(&mut Resources) + 'static,
{
    pub fn new(name: &'static str, build_fn: F) -> Self {
        Self { name, build_fn }
    }
}

impl<F> Plugin for FnPlugin<F>
where
    F: Fn(&mut Resources) + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn build(&self, resources: &mut Resources) {
        (self.build_fn)(resources);
    }
}
