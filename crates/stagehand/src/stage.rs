//! The stage: owns plugins and resources and drives the view manager.

use std::time::Duration;

use stagehand_core::alloc::HashMap;
use stagehand_core::profiling::{self, profile_function};
use stagehand_views::ViewManager;

use crate::plugin::Plugin;
use crate::resource::{Resource, Resources};
use crate::time::Time;

/// Holds every resource and the plugins that created them.
///
/// Typically built with [`StageBuilder`], updated once per frame and shut
/// down explicitly when the host application exits.
///
/// # Example
///
/// ```
/// use stagehand::{StageBuilder, TimePlugin, Time};
///
/// let mut stage = StageBuilder::new().add_plugin(TimePlugin).build();
/// stage.update();
///
/// assert_eq!(stage.get::<Time>().map(|t| t.frame_count()), Some(1));
/// stage.shutdown();
/// ```
pub struct Stage {
    resources: Resources,
    /// Plugins in build order
    plugins: Vec<Box<dyn Plugin>>,
}

impl Stage {
    pub fn builder() -> StageBuilder {
        StageBuilder::new()
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.resources.get::<R>()
    }

    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.resources.get_mut::<R>()
    }

    /// The view manager, if `ViewPlugin` was added.
    pub fn views(&self) -> Option<&ViewManager> {
        self.resources.get::<ViewManager>()
    }

    pub fn views_mut(&mut self) -> Option<&mut ViewManager> {
        self.resources.get_mut::<ViewManager>()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    /// Plugin names in build order.
    pub fn plugin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|p| p.name())
    }

    /// Run one frame using wall-clock time.
    pub fn update(&mut self) {
        profiling::new_frame();
        let dt = match self.resources.get_mut::<Time>() {
            Some(time) => {
                time.update();
                time.delta_seconds()
            }
            None => 0.0,
        };
        self.tick_views(dt);
    }

    /// Run one frame that lasted exactly `delta`.
    pub fn advance(&mut self, delta: Duration) {
        profiling::new_frame();
        let dt = match self.resources.get_mut::<Time>() {
            Some(time) => {
                time.advance(delta);
                time.delta_seconds()
            }
            None => delta.as_secs_f32(),
        };
        self.tick_views(dt);
    }

    fn tick_views(&mut self, dt: f32) {
        profile_function!();
        if let Some(views) = self.resources.get_mut::<ViewManager>() {
            views.tick(dt);
        }
    }

    /// Run every plugin's cleanup in reverse build order, then drop all
    /// resources.
    pub fn shutdown(mut self) {
        for plugin in self.plugins.iter().rev() {
            tracing::debug!("Cleaning up plugin: {}", plugin.name());
            plugin.cleanup(&mut self.resources);
        }
        tracing::info!("Stage shut down ({} resources dropped)", self.resources.len());
    }
}

impl Default for Stage {
    fn default() -> Self {
        StageBuilder::new().build()
    }
}

/// Builder for a [`Stage`].
///
/// ```
/// use stagehand::{FnPlugin, StageBuilder};
///
/// let stage = StageBuilder::new()
///     .insert_resource(60u32)
///     .add_plugin(FnPlugin::new("double", |resources| {
///         if let Some(fps) = resources.get_mut::<u32>() {
///             *fps *= 2;
///         }
///     }))
///     .build();
///
/// assert_eq!(stage.get::<u32>(), Some(&120));
/// ```
pub struct StageBuilder {
    plugins: Vec<Box<dyn Plugin>>,
    resources: Resources,
}

impl StageBuilder {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            resources: Resources::new(),
        }
    }

    /// Add a plugin. Plugins are built in the order they are added, after
    /// the plugins they depend on.
    pub fn add_plugin(mut self, plugin: impl Plugin) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Insert a resource before any plugin is built.
    pub fn insert_resource<R: Resource>(mut self, resource: R) -> Self {
        self.resources.insert(resource);
        self
    }

    /// Build every plugin, then call `finish` on each.
    pub fn build(mut self) -> Stage {
        let order = self.dependency_order();

        let mut slots: Vec<Option<Box<dyn Plugin>>> = self.plugins.into_iter().map(Some).collect();
        let plugins: Vec<Box<dyn Plugin>> = order
            .into_iter()
            .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
            .collect();

        for plugin in &plugins {
            tracing::debug!("Building plugin: {}", plugin.name());
            plugin.build(&mut self.resources);
        }
        for plugin in &plugins {
            plugin.finish(&mut self.resources);
        }

        tracing::info!(
            "Stage built with {} plugins: {:?}",
            plugins.len(),
            plugins.iter().map(|p| p.name()).collect::<Vec<_>>()
        );

        Stage {
            resources: self.resources,
            plugins,
        }
    }

    /// Topological order of plugin indices. Unknown dependencies are ignored.
    ///
    /// Plugins are visited in insertion order; names only resolve
    /// dependencies, so plugins sharing a name are all kept.
    fn dependency_order(&self) -> Vec<usize> {
        let mut index: HashMap<&'static str, Vec<usize>> = HashMap::default();
        for (i, plugin) in self.plugins.iter().enumerate() {
            let slots = index.entry(plugin.name()).or_default();
            if !slots.is_empty() {
                tracing::warn!("Multiple plugins named '{}'; building all of them", plugin.name());
            }
            slots.push(i);
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            Visiting,
            Done,
        }

        fn visit(
            idx: usize,
            plugins: &[Box<dyn Plugin>],
            index: &HashMap<&'static str, Vec<usize>>,
            marks: &mut [Mark],
            sorted: &mut Vec<usize>,
        ) {
            match marks[idx] {
                Mark::Done => return,
                Mark::Visiting => {
                    tracing::warn!(
                        "Circular plugin dependency detected involving: {}",
                        plugins[idx].name()
                    );
                    return;
                }
                Mark::New => {}
            }

            marks[idx] = Mark::Visiting;
            for &dep in plugins[idx].dependencies() {
                for &dep_idx in index.get(dep).map_or(&[][..], Vec::as_slice) {
                    visit(dep_idx, plugins, index, marks, sorted);
                }
            }
            marks[idx] = Mark::Done;
            sorted.push(idx);
        }

        let mut sorted = Vec::with_capacity(self.plugins.len());
        let mut marks = vec![Mark::New; self.plugins.len()];
        for idx in 0..self.plugins.len() {
            visit(idx, &self.plugins, &index, &mut marks, &mut sorted);
        }
        sorted
    }
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
