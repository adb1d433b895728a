//! Time plugin for frame timing.

use crate::plugin::Plugin;
use crate::resource::Resources;
use crate::time::Time;

/// Inserts the [`Time`] resource the stage derives each frame's delta from.
pub struct TimePlugin;

impl Plugin for TimePlugin {
    fn name(&self) -> &'static str {
        "TimePlugin"
    }

    fn build(&self, resources: &mut Resources) {
        resources.insert(Time::new());
        tracing::debug!("TimePlugin: Registered Time resource");
    }
}
