//! Mock implementation of PresentationHost for testing.
//!
//! Records every host call and keeps a tiny model of the node tree so tests
//! can assert on visibility, bucket membership and sibling order.

use crate::host::{Bucket, NodeId, PresentationHost};
use parking_lot::Mutex;

/// Records a host call for verification in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Instantiate {
        node: NodeId,
        type_name: &'static str,
    },
    SetVisible {
        node: NodeId,
        visible: bool,
    },
    Reparent {
        node: NodeId,
        bucket: Bucket,
    },
}

/// Modelled state of a node.
#[derive(Debug, Clone)]
struct MockNode {
    type_name: &'static str,
    visible: bool,
    bucket: Option<Bucket>,
    /// Stamp of the last reparent; higher is later among siblings.
    sibling_stamp: u64,
}

/// Mock implementation of [`PresentationHost`] for testing.
///
/// Nodes start visible (a freshly instantiated template is enabled) and
/// unparented.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use stagehand_test_utils::{Bucket, MockHost, PresentationHost};
///
/// let mock = Rc::new(MockHost::new());
/// let host: Rc<dyn PresentationHost> = mock.clone();
///
/// let node = host.instantiate("Inventory");
/// host.reparent(node, Bucket::Holding);
///
/// assert_eq!(mock.bucket_of(node), Some(Bucket::Holding));
/// assert_eq!(mock.call_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockHost {
    /// Recorded calls for verification
    calls: Mutex<Vec<HostCall>>,
    /// Node model, indexed by raw node id
    nodes: Mutex<Vec<MockNode>>,
    /// Counter for sibling ordering
    next_stamp: Mutex<u64>,
}

impl MockHost {
    /// Create a new mock host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forget recorded calls (node state is kept).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Count `instantiate` calls.
    pub fn count_instantiations(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, HostCall::Instantiate { .. }))
            .count()
    }

    /// Count `reparent` calls.
    pub fn count_reparents(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, HostCall::Reparent { .. }))
            .count()
    }

    /// Number of nodes created so far.
    pub fn node_count(&self) -> usize {
        self.nodes.lock().len()
    }

    /// Whether the node is currently visible.
    pub fn is_visible(&self, node: NodeId) -> bool {
        self.nodes
            .lock()
            .get(node.as_u64() as usize)
            .is_some_and(|n| n.visible)
    }

    /// The bucket the node is currently parented to.
    pub fn bucket_of(&self, node: NodeId) -> Option<Bucket> {
        self.nodes
            .lock()
            .get(node.as_u64() as usize)
            .and_then(|n| n.bucket)
    }

    /// The view type a node was instantiated for.
    pub fn type_name_of(&self, node: NodeId) -> Option<&'static str> {
        self.nodes
            .lock()
            .get(node.as_u64() as usize)
            .map(|n| n.type_name)
    }

    /// Children of `bucket` in sibling order (first drawn first).
    pub fn children(&self, bucket: Bucket) -> Vec<NodeId> {
        let nodes = self.nodes.lock();
        let mut children: Vec<(u64, NodeId)> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.bucket == Some(bucket))
            .map(|(i, n)| (n.sibling_stamp, NodeId::from_raw(i as u64)))
            .collect();
        children.sort_by_key(|(stamp, _)| *stamp);
        children.into_iter().map(|(_, node)| node).collect()
    }

    /// Visible nodes in drawable layers, in final draw order.
    pub fn draw_order(&self) -> Vec<NodeId> {
        let nodes = self.nodes.lock();
        let mut drawn: Vec<(u8, u64, NodeId)> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.visible)
            .filter_map(|(i, n)| match n.bucket {
                Some(Bucket::Layer { order, .. }) => {
                    Some((order, n.sibling_stamp, NodeId::from_raw(i as u64)))
                }
                _ => None,
            })
            .collect();
        drawn.sort_by_key(|(order, stamp, _)| (*order, *stamp));
        drawn.into_iter().map(|(_, _, node)| node).collect()
    }
}

impl PresentationHost for MockHost {
    fn instantiate(&self, type_name: &'static str) -> NodeId {
        let node = {
            let mut nodes = self.nodes.lock();
            nodes.push(MockNode {
                type_name,
                visible: true,
                bucket: None,
                sibling_stamp: 0,
            });
            NodeId::from_raw((nodes.len() - 1) as u64)
        };
        self.calls
            .lock()
            .push(HostCall::Instantiate { node, type_name });
        node
    }

    fn set_visible(&self, node: NodeId, visible: bool) {
        if let Some(n) = self.nodes.lock().get_mut(node.as_u64() as usize) {
            n.visible = visible;
        }
        self.calls.lock().push(HostCall::SetVisible { node, visible });
    }

    fn reparent(&self, node: NodeId, bucket: Bucket) {
        let stamp = {
            let mut next = self.next_stamp.lock();
            *next += 1;
            *next
        };
        if let Some(n) = self.nodes.lock().get_mut(node.as_u64() as usize) {
            n.bucket = Some(bucket);
            n.sibling_stamp = stamp;
        }
        self.calls.lock().push(HostCall::Reparent { node, bucket });
    }
}
