//! Invalidating handles - references that go "none" when a view is recycled.
//!
//! A [`WeakHandle`] is the single owning slot the manager keeps for every view
//! it hands out. Callers receive [`SharedHandle`]s derived from it. All of them
//! observe one invalidation signal: once the manager invalidates the weak
//! handle, every shared handle (including ones derived or cloned afterwards)
//! reads as `None` forever.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use stagehand_views::handle::WeakHandle;
//!
//! let mut weak = WeakHandle::new(Rc::new(5));
//! let shared = weak.share();
//! assert_eq!(shared.get().as_deref(), Some(&5));
//!
//! weak.invalidate();
//! assert!(shared.get().is_none());
//! assert!(weak.share().get().is_none());
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// One-shot signal shared by a weak handle and everything derived from it.
#[derive(Debug, Default)]
struct InvalidationSignal {
    fired: Cell<bool>,
}

impl InvalidationSignal {
    /// Fire the signal. Returns `false` if it had already fired.
    fn fire(&self) -> bool {
        !self.fired.replace(true)
    }

    fn is_fired(&self) -> bool {
        self.fired.get()
    }
}

/// The owning, nullable slot for an object.
///
/// Exclusively owned by its creator. Invalidation is terminal: there is no way
/// to put a value back into an invalidated handle.
pub struct WeakHandle<T: ?Sized> {
    value: Option<Rc<T>>,
    signal: Rc<InvalidationSignal>,
}

impl<T: ?Sized> WeakHandle<T> {
    /// Create a handle holding `value`.
    pub fn new(value: Rc<T>) -> Self {
        Self {
            value: Some(value),
            signal: Rc::new(InvalidationSignal::default()),
        }
    }

    /// The live reference, or `None` after invalidation.
    pub fn get(&self) -> Option<Rc<T>> {
        self.value.clone()
    }

    /// Whether the handle still holds its value.
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Drop the held reference and notify every derived handle.
    ///
    /// Only the first call has an effect.
    pub fn invalidate(&mut self) {
        if self.signal.fire() {
            self.value = None;
        }
    }

    /// Derive a shared handle observing this handle's invalidation.
    pub fn share(&self) -> SharedHandle<T> {
        SharedHandle::from_parts(self.value.as_ref(), Rc::clone(&self.signal))
    }

    /// Whether `shared` was derived from this handle.
    pub fn owns<U: ?Sized>(&self, shared: &SharedHandle<U>) -> bool {
        Rc::ptr_eq(&self.signal, &shared.signal)
    }
}

impl WeakHandle<dyn Any> {
    /// Derive a shared handle narrowed to the concrete type `U`.
    ///
    /// The handle is empty (but still tied to this handle's signal) when the
    /// held object is not a `U`.
    pub fn share_as<U: Any>(&self) -> SharedHandle<U> {
        let value = self.value.clone().and_then(|v| v.downcast::<U>().ok());
        SharedHandle::from_parts(value.as_ref(), Rc::clone(&self.signal))
    }
}

impl<T: ?Sized> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// A non-owning view of a [`WeakHandle`]'s value.
///
/// Reads `None` once the owner invalidated it, or once the owner and every
/// other strong reference are gone.
pub struct SharedHandle<T: ?Sized> {
    value: Option<Weak<T>>,
    signal: Rc<InvalidationSignal>,
}

impl<T: ?Sized> SharedHandle<T> {
    fn from_parts(value: Option<&Rc<T>>, signal: Rc<InvalidationSignal>) -> Self {
        Self {
            value: value.map(Rc::downgrade),
            signal,
        }
    }

    /// A handle that never had a value.
    pub fn empty() -> Self {
        let signal = InvalidationSignal::default();
        signal.fire();
        Self::from_parts(None, Rc::new(signal))
    }

    /// The live reference, or `None` once the owner invalidated it.
    pub fn get(&self) -> Option<Rc<T>> {
        if self.signal.is_fired() {
            return None;
        }
        self.value.as_ref().and_then(Weak::upgrade)
    }

    /// Whether [`get`](Self::get) would currently return a value.
    pub fn is_valid(&self) -> bool {
        !self.signal.is_fired() && self.value.as_ref().is_some_and(|v| v.strong_count() > 0)
    }
}

impl<T: ?Sized> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            signal: Rc::clone(&self.signal),
        }
    }
}

impl<T: ?Sized> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// A shared handle to a view of concrete type `V`.
pub type ViewHandle<V> = SharedHandle<RefCell<V>>;

impl<V: ?Sized> SharedHandle<RefCell<V>> {
    /// Run `f` with mutable access to the view.
    ///
    /// Returns `None` when the handle was invalidated or the view is already
    /// borrowed (for example from inside one of its own listeners).
    pub fn with<R>(&self, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let cell = self.get()?;
        let Ok(mut view) = cell.try_borrow_mut() else {
            tracing::warn!("View is already borrowed; ignoring handle access");
            return None;
        };
        Some(f(&mut view))
    }

    /// Run `f` with shared access to the view.
    pub fn with_ref<R>(&self, f: impl FnOnce(&V) -> R) -> Option<R> {
        let cell = self.get()?;
        let Ok(view) = cell.try_borrow() else {
            tracing::warn!("View is mutably borrowed; ignoring handle access");
            return None;
        };
        Some(f(&view))
    }

    /// Borrow the view mutably for longer than a closure.
    ///
    /// Returns the cell so the caller controls the borrow's scope:
    /// `handle.cell().map(|c| c.borrow_mut().show())`.
    pub fn cell(&self) -> Option<Rc<RefCell<V>>> {
        self.get()
    }
}
