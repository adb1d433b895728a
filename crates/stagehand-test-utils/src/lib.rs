//! Presentation host abstraction and test utilities for Stagehand.
//!
//! The view runtime never talks to a scene graph directly. Everything it needs
//! from the presentation layer goes through the [`PresentationHost`] trait:
//!
//! - [`PresentationHost::instantiate`] - create a live node for a new view
//! - [`PresentationHost::set_visible`] - show or hide a node
//! - [`PresentationHost::reparent`] - move a node into an ordering [`Bucket`]
//!
//! Two implementations ship with this crate:
//!
//! - [`NullHost`] - headless host that only hands out node ids
//! - `MockHost` - records every call for assertions (requires `mock` feature)
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use stagehand_test_utils::{Bucket, MockHost, PresentationHost};
//!
//! let host = MockHost::new();
//! let node = host.instantiate("Hud");
//! host.reparent(node, Bucket::layer("High", 2));
//! host.set_visible(node, true);
//!
//! assert_eq!(host.count_instantiations(), 1);
//! assert!(host.is_visible(node));
//! # }
//! ```
//!
//! # Interior Mutability
//!
//! Host methods take `&self` so a single host can be shared (`Rc<dyn
//! PresentationHost>`) between the pool, the manager and every live view.
//! Implementations keep their own state behind a lock.

pub mod host;
#[cfg(feature = "mock")]
pub mod mock_host;

pub use host::{Bucket, NodeId, NullHost, PresentationHost};
#[cfg(feature = "mock")]
pub use mock_host::{HostCall, MockHost};
