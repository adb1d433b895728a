//! The view trait and the per-instance state every view embeds.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use stagehand_test_utils::{NodeId, PresentationHost};

use crate::library::ViewType;
use crate::transition::{Transition, TransitionKind};

/// Identifier of a pooled view instance.
///
/// Assigned by the pool when the instance is created; stable across reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

impl ViewId {
    /// Id of a view that was never handed out by a pool.
    pub const UNASSIGNED: ViewId = ViewId(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Lifecycle state of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewState {
    /// Acquired but not shown yet.
    #[default]
    Idle,
    /// Intro transition in flight.
    Showing,
    /// Fully shown.
    Active,
    /// Close transition in flight.
    Closing,
    /// Closed; waiting to be returned to the pool.
    Closed,
}

/// Delivered to lifecycle listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEvent {
    pub view: ViewId,
    pub kind: TransitionKind,
    /// `true` if the transition was skipped or the request rejected.
    pub interrupted: bool,
}

/// One-shot lifecycle continuation.
///
/// Listeners run while the notifying view is mutably borrowed; they must not
/// try to borrow it again.
pub type Listener = Box<dyn FnOnce(ViewEvent)>;

/// A unit of UI, identified by its concrete type.
///
/// Implementors embed a [`ViewCore`] and may override the lifecycle hooks.
/// Show/close requests are made through
/// [`ViewLifecycle`](crate::lifecycle::ViewLifecycle), which every view gets
/// for free.
///
/// ```
/// use stagehand_views::{View, ViewCore};
///
/// #[derive(Clone, Default)]
/// struct Scoreboard {
///     core: ViewCore,
///     score: u32,
/// }
///
/// impl View for Scoreboard {
///     fn core(&self) -> &ViewCore {
///         &self.core
///     }
///
///     fn core_mut(&mut self) -> &mut ViewCore {
///         &mut self.core
///     }
///
///     fn on_start_showing(&mut self) {
///         self.score = 0;
///     }
/// }
/// ```
pub trait View: Any {
    fn core(&self) -> &ViewCore;

    fn core_mut(&mut self) -> &mut ViewCore;

    /// Called once per manager tick, after the transition advanced.
    fn on_update(&mut self, _dt: f32) {}

    fn on_start_showing(&mut self) {}

    fn on_finish_showing(&mut self) {}

    fn on_start_closing(&mut self) {}

    fn on_finish_closing(&mut self) {}
}

/// Lifecycle bookkeeping shared by every view.
///
/// Cloning a core (which happens when the pool clones a template) yields a
/// fresh, idle core: the transition is copied, but listeners, the instance id
/// and the host node are not.
#[derive(Default)]
pub struct ViewCore {
    pub(crate) id: ViewId,
    pub(crate) node: Option<NodeId>,
    host: Option<Rc<dyn PresentationHost>>,
    active: bool,
    pub(crate) state: ViewState,
    pub(crate) transition: Option<Box<dyn Transition>>,
    pub(crate) in_flight: Option<TransitionKind>,
    pub(crate) queued_close: bool,
    pub(crate) queued_listener: Option<Listener>,
    pub(crate) request_listener: Option<Listener>,
    pub(crate) on_show: Vec<Listener>,
    pub(crate) on_close: Vec<Listener>,
    /// Owner's notification that the view finished closing. Survives
    /// `clear_listeners`; dropped only by `reset` and `take_close_hook`.
    close_hook: Option<Listener>,
}

impl Default for ViewId {
    fn default() -> Self {
        ViewId::UNASSIGNED
    }
}

impl ViewCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A core that plays `transition` when shown and closed.
    pub fn with_transition(transition: impl Transition + 'static) -> Self {
        Self {
            transition: Some(Box::new(transition)),
            ..Self::default()
        }
    }

    pub fn set_transition(&mut self, transition: Option<Box<dyn Transition>>) {
        self.transition = transition;
    }

    pub fn has_transition(&self) -> bool {
        self.transition.is_some()
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Host node backing this view, once the pool instantiated it.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Whether the view is enabled (visible) on the host.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Direction of the transition in flight, if any.
    pub fn in_flight(&self) -> Option<TransitionKind> {
        self.in_flight
    }

    /// Whether a close request is waiting for the intro to finish.
    pub fn is_close_queued(&self) -> bool {
        self.queued_close
    }

    /// Enable or disable the view, forwarding visibility to the host.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if let (Some(host), Some(node)) = (&self.host, self.node) {
            host.set_visible(node, active);
        }
    }

    /// Bind this core to its pool identity and host node.
    pub(crate) fn attach(&mut self, id: ViewId, node: NodeId, host: Rc<dyn PresentationHost>) {
        self.id = id;
        self.node = Some(node);
        self.host = Some(host);
        // Freshly instantiated nodes are enabled.
        self.active = true;
    }

    /// Put a recycled instance back to `Idle` with no listeners.
    pub(crate) fn reset(&mut self) {
        self.state = ViewState::Idle;
        self.in_flight = None;
        self.close_hook = None;
        self.clear_listeners();
    }

    /// Install the callback run after every close listener.
    pub(crate) fn set_close_hook(&mut self, hook: impl FnOnce(ViewEvent) + 'static) {
        self.close_hook = Some(Box::new(hook));
    }

    pub(crate) fn take_close_hook(&mut self) -> Option<Listener> {
        self.close_hook.take()
    }

    pub(crate) fn clear_listeners(&mut self) {
        self.queued_close = false;
        self.queued_listener = None;
        self.request_listener = None;
        self.on_show.clear();
        self.on_close.clear();
    }
}

impl Clone for ViewCore {
    fn clone(&self) -> Self {
        Self {
            transition: self.transition.as_ref().map(|t| t.box_clone()),
            ..Self::default()
        }
    }
}

impl fmt::Debug for ViewCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCore")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("in_flight", &self.in_flight)
            .field("queued_close", &self.queued_close)
            .field("show_listeners", &self.on_show.len())
            .field("close_listeners", &self.on_close.len())
            .field("close_hook", &self.close_hook.is_some())
            .finish()
    }
}

/// Type-erased, shared reference to a pooled view instance.
///
/// Both pointers refer to the same allocation: `view` for driving the
/// lifecycle, `any` for recovering the concrete type.
#[derive(Clone)]
pub struct ViewRef {
    view: Rc<RefCell<dyn View>>,
    any: Rc<dyn Any>,
    ty: ViewType,
    id: ViewId,
    node: Option<NodeId>,
}

impl ViewRef {
    pub fn new<T: View>(view: T) -> Self {
        let id = view.core().id();
        let node = view.core().node();
        let rc = Rc::new(RefCell::new(view));
        let any: Rc<dyn Any> = rc.clone();
        Self {
            view: rc,
            any,
            ty: ViewType::of::<T>(),
            id,
            node,
        }
    }

    pub fn view(&self) -> &Rc<RefCell<dyn View>> {
        &self.view
    }

    pub fn as_any(&self) -> Rc<dyn Any> {
        Rc::clone(&self.any)
    }

    pub fn ty(&self) -> ViewType {
        self.ty
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// The instance as its concrete type, if it is a `T`.
    pub fn downcast<T: View>(&self) -> Option<Rc<RefCell<T>>> {
        self.as_any().downcast::<RefCell<T>>().ok()
    }

    /// Whether both refer to the same instance.
    pub fn ptr_eq(&self, other: &ViewRef) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.any) as *const (),
            Rc::as_ptr(&other.any) as *const (),
        )
    }
}

impl fmt::Debug for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRef")
            .field("id", &self.id)
            .field("type", &self.ty.name())
            .finish()
    }
}
