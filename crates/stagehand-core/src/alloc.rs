//! Hash collections used across Stagehand.
//!
//! The view registry, pool slots and plugin bookkeeping are all keyed by
//! `TypeId` or small integer ids, so the faster AHash hasher is used in place
//! of SipHash everywhere.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

/// Type alias for a `HashMap` using AHash.
pub type AHashMap<K, V> = ahash::AHashMap<K, V>;

/// Type alias for a `HashSet` using AHash.
pub type AHashSet<T> = ahash::AHashSet<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    #[test]
    fn test_type_id_keys() {
        let mut map = HashMap::new();
        map.insert(TypeId::of::<u32>(), "u32");
        map.insert(TypeId::of::<String>(), "String");

        assert_eq!(map.get(&TypeId::of::<u32>()), Some(&"u32"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_set_deduplicates() {
        let mut set = HashSet::new();
        assert!(set.insert("hud"));
        assert!(!set.insert("hud"));
        assert_eq!(set.len(), 1);
    }
}
