//! The view manager: registry, pool, active set and per-frame tick.
//!
//! # Lifecycle of a requested view
//!
//! 1. [`ViewManager::request_view`] borrows an instance from the pool, parks
//!    it hidden in its priority bucket and hands out a [`ViewHandle`].
//! 2. The caller shows and closes it through the handle.
//! 3. When the close finishes, the view moves to the pending-return queue.
//! 4. The next [`ViewManager::tick`] clears its listeners, returns it to the
//!    pool and invalidates every handle to it.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use stagehand_test_utils::NullHost;
//! use stagehand_views::{
//!     ManagerConfig, View, ViewCore, ViewLibrary, ViewLifecycle, ViewManager, ViewPriority,
//! };
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
//! let mut manager = ViewManager::new(Rc::new(NullHost::new()), ManagerConfig::default());
//! manager.register_library(&ViewLibrary::new("game").with(Hud::default()));
//!
//! let hud = manager.request_view::<Hud>(ViewPriority::High).unwrap();
//! hud.with(|v| v.show());
//! hud.with(|v| v.close());
//!
//! manager.tick(0.016);
//! assert!(hud.get().is_none());
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use stagehand_core::profiling::{profile_function, profile_scope};
use stagehand_test_utils::PresentationHost;

use crate::config::ManagerConfig;
use crate::error::{ViewError, ViewResult};
use crate::handle::{SharedHandle, ViewHandle, WeakHandle};
use crate::library::{Registry, ViewLibrary, ViewType};
use crate::lifecycle::ViewLifecycle;
use crate::pool::ObjectPool;
use crate::priority::ViewPriority;
use crate::view::{View, ViewId, ViewRef};

/// Ticks [`ViewManager::shutdown`] spends waiting for close transitions.
const SHUTDOWN_TICK_LIMIT: usize = 1024;

/// Shutdown step, in seconds, when the configured `max_delta` is unusable.
const SHUTDOWN_STEP: f32 = 0.25;

struct ActiveEntry {
    view: ViewRef,
    handle: WeakHandle<dyn Any>,
    priority: ViewPriority,
    /// Placement stamp; later placements draw on top within a bucket.
    stamp: u64,
}

/// Views handed out by the manager. Shared with the close listeners.
#[derive(Default)]
struct ViewSet {
    active: Vec<ActiveEntry>,
    pending: Vec<ActiveEntry>,
    next_stamp: u64,
}

impl ViewSet {
    fn stamp(&mut self) -> u64 {
        self.next_stamp += 1;
        self.next_stamp
    }

    fn on_view_closed(&mut self, id: ViewId) {
        match self.active.iter().position(|e| e.view.id() == id) {
            Some(position) => {
                let entry = self.active.remove(position);
                tracing::debug!("{} closed; returning to pool on next tick", id);
                self.pending.push(entry);
            }
            None => tracing::trace!("Closed {} is not active", id),
        }
    }

    fn find<U: ?Sized>(&mut self, handle: &SharedHandle<U>) -> Option<&mut ActiveEntry> {
        self.active.iter_mut().find(|e| e.handle.owns(handle))
    }
}

/// Owns every view instance and drives them once per frame.
///
/// Single-threaded: the manager, its views and their handles must stay on the
/// thread that created them.
pub struct ViewManager {
    host: Rc<dyn PresentationHost>,
    config: ManagerConfig,
    registry: Registry,
    pool: ObjectPool,
    views: Rc<RefCell<ViewSet>>,
}

static_assertions::assert_not_impl_any!(ViewManager: Send, Sync);

impl ViewManager {
    pub fn new(host: Rc<dyn PresentationHost>, config: ManagerConfig) -> Self {
        tracing::debug!("Creating view manager with {:?}", config);
        Self {
            pool: ObjectPool::new(Rc::clone(&host)),
            host,
            config,
            registry: Registry::new(),
            views: Rc::new(RefCell::new(ViewSet::default())),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ManagerConfig {
        &mut self.config
    }

    /// Add the library's templates. Types that are already known keep their
    /// existing template. Returns how many types were added.
    pub fn register_library(&mut self, library: &ViewLibrary) -> usize {
        let added = self.registry.register(library);
        tracing::debug!(
            "Registered library '{}' ({} of {} templates new)",
            library.name(),
            added,
            library.len()
        );
        added
    }

    /// Close every active view whose type is in `library`, then forget the
    /// library's types.
    pub fn unregister_library(&mut self, library: &ViewLibrary) {
        for template in library.templates() {
            for view in self.active_of(template.ty()) {
                close_view(&view);
            }
        }

        let removed = self.registry.unregister(library);
        tracing::debug!(
            "Unregistered library '{}' ({} types removed)",
            library.name(),
            removed.len()
        );
    }

    pub fn is_registered<T: View>(&self) -> bool {
        self.registry.contains(ViewType::of::<T>().id())
    }

    pub fn loaded_libraries(&self) -> &[String] {
        self.registry.loaded_libraries()
    }

    /// Hand out a new (or recycled) instance of `T`, hidden, in `priority`'s
    /// bucket. Call `show` on it to display it.
    pub fn request_view<T: View + Clone>(
        &mut self,
        priority: ViewPriority,
    ) -> ViewResult<ViewHandle<T>> {
        let ty = ViewType::of::<T>();
        let Some(template) = self.registry.get(ty.id()) else {
            let error = ViewError::NotRegistered { type_name: ty.name() };
            tracing::warn!("{}", error);
            return Err(error);
        };

        let view = self
            .pool
            .acquire::<T>(template.prototype::<T>())
            .ok_or(ViewError::NoTemplate { type_name: ty.name() })?;
        let id = view.id();

        if let Some(node) = view.node() {
            self.host.reparent(node, priority.bucket());
        }
        {
            let mut instance = view.view().borrow_mut();
            instance.core_mut().reset();
            instance.core_mut().set_active(false);

            let views = Rc::downgrade(&self.views);
            instance.core_mut().set_close_hook(move |_| notify_closed(&views, id));
        }

        let handle = WeakHandle::new(view.as_any());
        let shared = handle.share_as::<RefCell<T>>();

        let mut views = self.views.borrow_mut();
        let stamp = views.stamp();
        views.active.push(ActiveEntry {
            view,
            handle,
            priority,
            stamp,
        });

        tracing::debug!("Requested {} ({}) at {}", id, ty.name(), priority.name());
        Ok(shared)
    }

    /// The first active instance of `T`, moved to `priority` when one is
    /// given, or a new one requested at `priority` (or the configured
    /// default).
    pub fn get_or_create<T: View + Clone>(
        &mut self,
        priority: Option<ViewPriority>,
    ) -> ViewResult<ViewHandle<T>> {
        let ty = ViewType::of::<T>();
        let existing = self
            .views
            .borrow()
            .active
            .iter()
            .find(|e| e.view.ty() == ty)
            .map(|e| e.handle.share_as::<RefCell<T>>());

        match existing {
            Some(handle) => {
                if let Some(priority) = priority {
                    self.set_priority(&handle, priority);
                }
                Ok(handle)
            }
            None => self.request_view::<T>(priority.unwrap_or(self.config.default_priority)),
        }
    }

    /// Move an active view to another priority bucket, on top of the views
    /// already there. Lifecycle state is unaffected. Returns `false` if the
    /// handle doesn't refer to an active view.
    pub fn set_priority<U: ?Sized>(
        &mut self,
        handle: &SharedHandle<U>,
        priority: ViewPriority,
    ) -> bool {
        let mut views = self.views.borrow_mut();
        let stamp = views.stamp();
        let Some(entry) = views.find(handle) else {
            tracing::debug!("Ignoring priority change for an inactive view");
            return false;
        };

        entry.priority = priority;
        entry.stamp = stamp;
        if let Some(node) = entry.view.node() {
            self.host.reparent(node, priority.bucket());
        }
        tracing::debug!("Moved {} to {}", entry.view.id(), priority.name());
        true
    }

    pub fn priority_of<U: ?Sized>(&self, handle: &SharedHandle<U>) -> Option<ViewPriority> {
        self.views
            .borrow()
            .active
            .iter()
            .find(|e| e.handle.owns(handle))
            .map(|e| e.priority)
    }

    /// Visible active views, first drawn first.
    pub fn draw_order(&self) -> Vec<ViewId> {
        let views = self.views.borrow();
        let mut drawn: Vec<&ActiveEntry> = views
            .active
            .iter()
            .filter(|e| {
                e.view
                    .view()
                    .try_borrow()
                    .map_or(true, |v| v.core().is_active())
            })
            .collect();
        drawn.sort_by_key(|e| (e.priority, e.stamp));
        drawn.into_iter().map(|e| e.view.id()).collect()
    }

    pub fn active_count(&self) -> usize {
        self.views.borrow().active.len()
    }

    /// Views closed and waiting for the next tick to be pooled.
    pub fn pending_count(&self) -> usize {
        self.views.borrow().pending.len()
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn host(&self) -> &Rc<dyn PresentationHost> {
        &self.host
    }

    /// Advance every active view, then recycle the views that finished
    /// closing.
    ///
    /// `dt` is clamped to `[0, max_delta]` and scaled by the configured time
    /// scale.
    pub fn tick(&mut self, dt: f32) {
        profile_function!();
        let dt = self.config.scaled_delta(dt);
        self.step(dt);
    }

    /// Update pass with an already clamped and scaled `dt`, then
    /// finalisation.
    fn step(&mut self, dt: f32) {
        // Listeners fired during updates borrow the view set.
        let snapshot: Vec<ViewRef> = self
            .views
            .borrow()
            .active
            .iter()
            .map(|e| e.view.clone())
            .collect();

        {
            profile_scope!("update_views");
            for view in &snapshot {
                match view.view().try_borrow_mut() {
                    Ok(mut instance) => instance.update(dt),
                    Err(_) => tracing::warn!("Skipping update of busy {}", view.id()),
                }
            }
        }

        self.finalize_pending();
    }

    fn finalize_pending(&mut self) {
        profile_scope!("finalize_pending");
        let pending = std::mem::take(&mut self.views.borrow_mut().pending);

        for mut entry in pending {
            match entry.view.view().try_borrow_mut() {
                Ok(mut instance) => {
                    instance.clear_listeners();
                    instance.core_mut().take_close_hook();
                }
                Err(_) => tracing::warn!("Could not clear listeners of busy {}", entry.view.id()),
            }
            if let Err(e) = self.pool.release(&entry.view) {
                tracing::warn!("Failed to pool {}: {}", entry.view.id(), e);
            }
            entry.handle.invalidate();
            tracing::trace!("Recycled {}", entry.view.id());
        }
    }

    /// Request a close on every active view. Returns how many were asked.
    pub fn close_all(&mut self) -> usize {
        let snapshot: Vec<ViewRef> = self
            .views
            .borrow()
            .active
            .iter()
            .map(|e| e.view.clone())
            .collect();

        for view in &snapshot {
            close_view(view);
        }
        snapshot.len()
    }

    /// Close every view and tick until all of them are back in the pool.
    ///
    /// Shutdown ignores the time scale, so paused managers still drain.
    /// Gives up after a bounded number of ticks if some close never
    /// completes.
    pub fn shutdown(&mut self) {
        profile_function!();
        self.close_all();

        let step = if self.config.max_delta.is_finite() && self.config.max_delta > 0.0 {
            self.config.max_delta
        } else {
            SHUTDOWN_STEP
        };

        let mut ticks = 0;
        while self.active_count() + self.pending_count() > 0 && ticks < SHUTDOWN_TICK_LIMIT {
            self.step(step);
            ticks += 1;
        }

        let remaining = self.active_count();
        if remaining > 0 {
            tracing::warn!("{} views still active after shutdown", remaining);
        } else {
            tracing::debug!("View manager shut down after {} ticks", ticks);
        }
    }

    fn active_of(&self, ty: ViewType) -> Vec<ViewRef> {
        self.views
            .borrow()
            .active
            .iter()
            .filter(|e| e.view.ty() == ty)
            .map(|e| e.view.clone())
            .collect()
    }
}

fn close_view(view: &ViewRef) {
    match view.view().try_borrow_mut() {
        Ok(mut instance) => {
            instance.close();
        }
        Err(_) => tracing::warn!("Cannot close busy {}", view.id()),
    }
}

fn notify_closed(views: &Weak<RefCell<ViewSet>>, id: ViewId) {
    let Some(views) = views.upgrade() else {
        return;
    };
    match views.try_borrow_mut() {
        Ok(mut views) => views.on_view_closed(id),
        Err(_) => tracing::warn!("View set busy while {} closed", id),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewCore;
    use stagehand_test_utils::{Bucket, MockHost};

    #[derive(Clone, Default)]
    struct Hud {
        core: ViewCore,
    }

    impl View for Hud {
        fn core(&self) -> &ViewCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ViewCore {
            &mut self.core
        }
    }

    fn manager() -> (Rc<MockHost>, ViewManager) {
        let mock = Rc::new(MockHost::new());
        let mut manager = ViewManager::new(mock.clone(), ManagerConfig::default());
        manager.register_library(&ViewLibrary::new("test").with(Hud::default()));
        (mock, manager)
    }

    #[test]
    fn test_request_view_parks_hidden_in_bucket() {
        let (mock, mut manager) = manager();
        let hud = manager.request_view::<Hud>(ViewPriority::High).unwrap();

        let node = hud.with_ref(|v| v.core().node()).flatten().unwrap();
        assert_eq!(mock.bucket_of(node), Some(ViewPriority::High.bucket()));
        assert!(!mock.is_visible(node));
        assert_eq!(manager.active_count(), 1);
        assert_eq!(manager.priority_of(&hud), Some(ViewPriority::High));
    }

    #[test]
    fn test_close_moves_to_pending_until_tick() {
        let (mock, mut manager) = manager();
        let hud = manager.request_view::<Hud>(ViewPriority::Medium).unwrap();
        hud.with(|v| v.show());
        hud.with(|v| v.close());

        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.pending_count(), 1);
        assert!(hud.get().is_some());

        manager.tick(0.016);
        assert!(hud.get().is_none());
        assert_eq!(manager.pending_count(), 0);
        assert_eq!(manager.pool().available_count::<Hud>(), 1);

        let node = mock.children(Bucket::Holding)[0];
        assert!(!mock.is_visible(node));
    }

    #[test]
    fn test_get_or_create_returns_existing() {
        let (_mock, mut manager) = manager();
        let first = manager.get_or_create::<Hud>(None).unwrap();
        let second = manager.get_or_create::<Hud>(Some(ViewPriority::Ultra)).unwrap();

        assert!(Rc::ptr_eq(&first.get().unwrap(), &second.get().unwrap()));
        assert_eq!(manager.active_count(), 1);
        assert_eq!(manager.priority_of(&first), Some(ViewPriority::Ultra));
    }

    #[test]
    fn test_stale_handle_priority_change_is_ignored() {
        let (_mock, mut manager) = manager();
        let hud = manager.request_view::<Hud>(ViewPriority::Low).unwrap();
        hud.with(|v| v.close());
        manager.tick(0.0);

        assert!(!manager.set_priority(&hud, ViewPriority::High));
        assert_eq!(manager.priority_of(&hud), None);
    }

    #[test]
    fn test_shutdown_recycles_everything() {
        let (_mock, mut manager) = manager();
        let a = manager.request_view::<Hud>(ViewPriority::Low).unwrap();
        let b = manager.request_view::<Hud>(ViewPriority::High).unwrap();
        a.with(|v| v.show());

        manager.shutdown();
        assert!(a.get().is_none());
        assert!(b.get().is_none());
        assert_eq!(manager.pool().available_count::<Hud>(), 2);
    }
}
