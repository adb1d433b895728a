//! Built-in plugins.

mod time_plugin;
mod view_plugin;

pub use time_plugin::TimePlugin;
pub use view_plugin::ViewPlugin;
