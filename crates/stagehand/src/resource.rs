//! Resource storage for the stage.
//!
//! Resources are shared data owned by the stage and reached by type. The view
//! manager is one of them, so resources are not required to be `Send`.

use std::any::{Any, TypeId};

use stagehand_core::alloc::HashMap;

/// Marker trait for types that can be stored as stage resources.
pub trait Resource: 'static {}

impl<T: 'static> Resource for T {}

struct ResourceEntry {
    data: Box<dyn Any>,
    type_name: &'static str,
}

/// Container for stage resources, one instance per type.
///
/// # Example
///
/// ```
/// use stagehand::resource::Resources;
///
/// struct Theme {
///     accent: u32,
/// }
///
/// let mut resources = Resources::new();
/// resources.insert(Theme { accent: 0xff8800 });
///
/// assert_eq!(resources.get::<Theme>().map(|t| t.accent), Some(0xff8800));
/// ```
#[derive(Default)]
pub struct Resources {
    storage: HashMap<TypeId, ResourceEntry>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, returning the one it replaced.
    pub fn insert<R: Resource>(&mut self, resource: R) -> Option<R> {
        let entry = ResourceEntry {
            data: Box::new(resource),
            type_name: std::any::type_name::<R>(),
        };

        self.storage
            .insert(TypeId::of::<R>(), entry)
            .and_then(|old| old.data.downcast::<R>().ok().map(|b| *b))
    }

    pub fn get<R: Resource>(&self) -> Option<&R> {
        self.storage
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.data.downcast_ref())
    }

    pub fn get_mut<R: Resource>(&mut self) -> Option<&mut R> {
        self.storage
            .get_mut(&TypeId::of::<R>())
            .and_then(|entry| entry.data.downcast_mut())
    }

    pub fn remove<R: Resource>(&mut self) -> Option<R> {
        self.storage
            .remove(&TypeId::of::<R>())
            .and_then(|entry| entry.data.downcast::<R>().ok().map(|b| *b))
    }

    pub fn contains<R: Resource>(&self) -> bool {
        self.storage.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Resource type names, for debugging.
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storage.values().map(|entry| entry.type_name)
    }
}

impl std::fmt::Debug for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resources")
            .field("count", &self.storage.len())
            .field("types", &self.type_names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_insert_and_replace() {
        let mut resources = Resources::new();
        assert_eq!(resources.insert(1u8), None);
        assert_eq!(resources.insert(2u8), Some(1));
        assert_eq!(resources.get::<u8>(), Some(&2));
    }

    #[test]
    fn test_non_send_resource() {
        let mut resources = Resources::new();
        resources.insert(Rc::new(5));

        assert_eq!(resources.get::<Rc<i32>>().map(|r| **r), Some(5));
        assert!(resources.contains::<Rc<i32>>());
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut resources = Resources::new();
        resources.insert(vec![1]);
        if let Some(v) = resources.get_mut::<Vec<i32>>() {
            v.push(2);
        }

        assert_eq!(resources.remove::<Vec<i32>>(), Some(vec![1, 2]));
        assert!(resources.is_empty());
    }
}
