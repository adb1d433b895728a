//! Stagehand - a runtime for pooled, prioritised UI views.
//!
//! This crate ties the pieces together behind a small plugin system:
//!
//! - **Views**: pooled view instances with a show/close lifecycle
//!   ([`views`])
//! - **Presentation host**: the three-call contract to the scene layer
//!   ([`host`])
//! - **Stage**: owns resources and plugins and drives one frame at a time
//! - **Ambient**: logging and profiling setup ([`core`])
//!
//! # Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use std::time::Duration;
//! use stagehand::prelude::*;
//!
//! #[derive(Clone, Default)]
//! struct Hud {
//!     core: ViewCore,
//! }
//!
//! impl View for Hud {
//!     fn core(&self) -> &ViewCore { &self.core }
//!     fn core_mut(&mut self) -> &mut ViewCore { &mut self.core }
//! }
//!
//! let mut stage = Stage::builder()
//!     .add_plugin(TimePlugin)
//!     .add_plugin(
//!         ViewPlugin::headless().with_library(ViewLibrary::new("game").with(Hud::default())),
//!     )
//!     .build();
//!
//! let hud = stage
//!     .views_mut()
//!     .and_then(|views| views.get_or_create::<Hud>(Some(ViewPriority::High)).ok())
//!     .unwrap();
//! hud.with(|v| v.show());
//!
//! stage.advance(Duration::from_millis(16));
//! stage.shutdown();
//! assert!(hud.get().is_none());
//! ```

pub mod plugin;
pub mod plugins;
pub mod resource;
pub mod stage;
pub mod time;

pub use stagehand_core as core;
pub use stagehand_test_utils as host;
pub use stagehand_views as views;

pub use plugin::{FnPlugin, Plugin};
pub use plugins::{TimePlugin, ViewPlugin};
pub use resource::{Resource, Resources};
pub use stage::{Stage, StageBuilder};
pub use time::Time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::plugin::{FnPlugin, Plugin};
    pub use crate::plugins::{TimePlugin, ViewPlugin};
    pub use crate::resource::{Resource, Resources};
    pub use crate::stage::{Stage, StageBuilder};
    pub use crate::time::Time;

    pub use stagehand_test_utils::{Bucket, NodeId, NullHost, PresentationHost};
    pub use stagehand_views::{
        ClipTransition, ManagerConfig, RequestOutcome, View, ViewCore, ViewEvent, ViewHandle,
        ViewLibrary, ViewLifecycle, ViewManager, ViewPriority, ViewState,
    };
}
