//! The presentation host contract.

use std::cell::Cell;
use std::fmt;

/// Identifier of a live node owned by the presentation host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a node id from a raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A named ordering group nodes can be parented to.
///
/// Layers are drawn in ascending `order`; inside a layer the node that was
/// reparented last is drawn on top. `Holding` is the neutral area pooled
/// nodes are parked in and is never drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Parking area for pooled, inactive nodes.
    Holding,
    /// A drawable layer.
    Layer {
        /// Display name of the layer.
        name: &'static str,
        /// Sibling index of the layer; higher draws later.
        order: u8,
    },
}

impl Bucket {
    /// Shorthand for [`Bucket::Layer`].
    pub const fn layer(name: &'static str, order: u8) -> Self {
        Bucket::Layer { name, order }
    }

    /// Whether nodes in this bucket are drawn.
    pub const fn is_drawable(&self) -> bool {
        matches!(self, Bucket::Layer { .. })
    }
}

/// Everything the view runtime needs from the scene/rendering layer.
///
/// Methods take `&self`; implementations use interior mutability so one host
/// can be shared by the pool, the manager and the views.
pub trait PresentationHost {
    /// Create a new live node for an instance of the named view type.
    fn instantiate(&self, type_name: &'static str) -> NodeId;

    /// Toggle a node's visible/enabled state.
    fn set_visible(&self, node: NodeId, visible: bool);

    /// Move a node into an ordering bucket, placing it last among its siblings.
    fn reparent(&self, node: NodeId, bucket: Bucket);
}

/// Headless host: hands out node ids and otherwise does nothing.
#[derive(Debug, Default)]
pub struct NullHost {
    next_node: Cell<u64>,
}

impl NullHost {
    /// Create a new headless host.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationHost for NullHost {
    fn instantiate(&self, type_name: &'static str) -> NodeId {
        let id = self.next_node.get();
        self.next_node.set(id + 1);
        tracing::trace!("NullHost: instantiated {} as node#{}", type_name, id);
        NodeId(id)
    }

    fn set_visible(&self, _node: NodeId, _visible: bool) {}

    fn reparent(&self, _node: NodeId, _bucket: Bucket) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_host_ids_are_unique() {
        let host = NullHost::new();
        let a = host.instantiate("A");
        let b = host.instantiate("A");
        assert_ne!(a, b);
        assert_eq!(b.as_u64(), a.as_u64() + 1);
    }

    #[test]
    fn test_bucket_drawable() {
        assert!(!Bucket::Holding.is_drawable());
        assert!(Bucket::layer("Low", 0).is_drawable());
    }
}
