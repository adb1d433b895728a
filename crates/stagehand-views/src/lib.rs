//! Stagehand Views - pooled UI views with an explicit lifecycle.
//!
//! The crate is built around a few pieces:
//!
//! - [`ViewManager`] - registry of view templates, object pool, active set
//!   and per-frame tick
//! - [`View`] / [`ViewCore`] - the trait every view implements and the state
//!   it embeds
//! - [`ViewLifecycle`] - show/close state machine with optional transitions
//! - [`WeakHandle`] / [`SharedHandle`] - references that read `None` once the
//!   view is recycled
//! - [`TransitionRunner`] - timed clip transitions reporting completion once
//!
//! Everything is single-threaded. The presentation layer is reached only
//! through [`stagehand_test_utils::PresentationHost`].
//!
//! # Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use stagehand_test_utils::NullHost;
//! use stagehand_views::{
//!     ClipTransition, ManagerConfig, View, ViewCore, ViewLibrary, ViewLifecycle, ViewManager,
//!     ViewPriority, ViewState,
//! };
//!
//! #[derive(Clone)]
//! struct Inventory {
//!     core: ViewCore,
//! }
//!
//! impl View for Inventory {
//!     fn core(&self) -> &ViewCore { &self.core }
//!     fn core_mut(&mut self) -> &mut ViewCore { &mut self.core }
//! }
//!
//! let template = Inventory {
//!     core: ViewCore::with_transition(ClipTransition::timed(0.2, 0.2)),
//! };
//!
//! let mut manager = ViewManager::new(Rc::new(NullHost::new()), ManagerConfig::default());
//! manager.register_library(&ViewLibrary::new("menus").with(template));
//!
//! let inventory = manager.request_view::<Inventory>(ViewPriority::High).unwrap();
//! inventory.with(|v| v.show());
//!
//! manager.tick(0.1);
//! manager.tick(0.1);
//! assert_eq!(inventory.with_ref(|v| v.core().state()), Some(ViewState::Active));
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod library;
pub mod lifecycle;
pub mod manager;
pub mod pool;
pub mod priority;
pub mod transition;
pub mod view;

pub use config::ManagerConfig;
pub use error::{ViewError, ViewResult};
pub use handle::{SharedHandle, ViewHandle, WeakHandle};
pub use library::{Registry, Template, ViewLibrary, ViewType};
pub use lifecycle::{RequestOutcome, ViewLifecycle};
pub use manager::ViewManager;
pub use pool::ObjectPool;
pub use priority::ViewPriority;
pub use transition::{
    Clip, ClipDriver, ClipSet, ClipTransition, Completion, Transition, TransitionError,
    TransitionKind, TransitionRunner,
};
pub use view::{Listener, View, ViewCore, ViewEvent, ViewId, ViewRef, ViewState};
