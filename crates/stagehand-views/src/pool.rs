//! Recycling of view instances by concrete type.
//!
//! Every type has its own slot with two disjoint lists: instances that are
//! *available* for reuse and instances currently *borrowed*. Instances are
//! created by cloning a template and instantiating a host node for the clone;
//! returned instances are hidden and parked in [`Bucket::Holding`].

use std::any::TypeId;
use std::rc::Rc;

use stagehand_core::alloc::HashMap;
use stagehand_test_utils::{Bucket, PresentationHost};

use crate::error::{ViewError, ViewResult};
use crate::library::ViewType;
use crate::view::{View, ViewId, ViewRef};

#[derive(Default)]
struct PoolSlot {
    available: Vec<ViewRef>,
    borrowed: Vec<ViewRef>,
}

/// Per-type pool of view instances.
pub struct ObjectPool {
    host: Rc<dyn PresentationHost>,
    slots: HashMap<TypeId, PoolSlot>,
    next_id: u64,
}

impl ObjectPool {
    pub fn new(host: Rc<dyn PresentationHost>) -> Self {
        Self {
            host,
            slots: HashMap::default(),
            next_id: 0,
        }
    }

    /// Borrow an instance of exactly `T`.
    ///
    /// The most recently returned instance is reused first. Without one, a
    /// clone of `template` is created; with neither, returns `None`.
    pub fn acquire<T: View + Clone>(&mut self, template: Option<&T>) -> Option<ViewRef> {
        let ty = ViewType::of::<T>();
        let slot = self.slots.entry(ty.id()).or_default();

        if let Some(view) = slot.available.pop() {
            tracing::debug!("Reusing pooled {} ({})", view.id(), ty.name());
            slot.borrowed.push(view.clone());
            return Some(view);
        }

        let Some(template) = template else {
            tracing::debug!("{}", ViewError::NoTemplate { type_name: ty.name() });
            return None;
        };

        self.next_id += 1;
        let id = ViewId::from_raw(self.next_id);
        let node = self.host.instantiate(ty.name());

        let mut instance = template.clone();
        instance.core_mut().attach(id, node, Rc::clone(&self.host));
        let view = ViewRef::new(instance);

        tracing::debug!("Created {} ({}) on {}", id, ty.name(), node);
        slot.borrowed.push(view.clone());
        Some(view)
    }

    /// Return a borrowed instance.
    ///
    /// The instance is hidden and reparented to the holding bucket. Fails with
    /// [`ViewError::InvalidReturn`], changing nothing, if it isn't borrowed.
    pub fn release(&mut self, view: &ViewRef) -> ViewResult<()> {
        let ty = view.ty();
        let position = self
            .slots
            .get(&ty.id())
            .and_then(|slot| slot.borrowed.iter().position(|v| v.ptr_eq(view)));

        let (Some(position), Some(slot)) = (position, self.slots.get_mut(&ty.id())) else {
            let error = ViewError::InvalidReturn { type_name: ty.name() };
            tracing::warn!("{} ({})", error, view.id());
            return Err(error);
        };

        let view = slot.borrowed.swap_remove(position);
        match view.view().try_borrow_mut() {
            Ok(mut instance) => instance.core_mut().set_active(false),
            Err(_) => {
                tracing::warn!("{} is borrowed while being pooled; hiding node only", view.id());
                if let Some(node) = view.node() {
                    self.host.set_visible(node, false);
                }
            }
        }
        if let Some(node) = view.node() {
            self.host.reparent(node, Bucket::Holding);
        }

        tracing::debug!("Pooled {} ({})", view.id(), ty.name());
        slot.available.push(view);
        Ok(())
    }

    /// Number of instances of `T` ready for reuse.
    pub fn available_count<T: View>(&self) -> usize {
        self.slots
            .get(&TypeId::of::<T>())
            .map_or(0, |slot| slot.available.len())
    }

    /// Number of instances of `T` currently handed out.
    pub fn borrowed_count<T: View>(&self) -> usize {
        self.slots
            .get(&TypeId::of::<T>())
            .map_or(0, |slot| slot.borrowed.len())
    }

    /// Whether `view` is sitting in the available list.
    pub fn contains_available(&self, view: &ViewRef) -> bool {
        self.slots
            .get(&view.ty().id())
            .is_some_and(|slot| slot.available.iter().any(|v| v.ptr_eq(view)))
    }

    /// Whether `view` is currently borrowed.
    pub fn is_borrowed(&self, view: &ViewRef) -> bool {
        self.slots
            .get(&view.ty().id())
            .is_some_and(|slot| slot.borrowed.iter().any(|v| v.ptr_eq(view)))
    }

    /// Instances of every type the pool has created.
    pub fn total_instances(&self) -> usize {
        self.slots
            .values()
            .map(|slot| slot.available.len() + slot.borrowed.len())
            .sum()
    }

    pub fn host(&self) -> &Rc<dyn PresentationHost> {
        &self.host
    }
}
