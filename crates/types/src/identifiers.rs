//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier.
///
/// Identifies a ramp, worker, or storehouse within its registry. Ids
/// are chosen by whoever builds the topology; the engine only requires
/// them to be unique per registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Package identifier.
///
/// Unique among live packages at any instant; recycled through the
/// id pool's free list once the package is retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId(pub u64);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Package({})", self.0)
    }
}

/// Which registry a receiver handle points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReceiverKind {
    /// A processing node with an input queue.
    Worker,
    /// A terminal node that accumulates packages.
    Storehouse,
}

impl fmt::Display for ReceiverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverKind::Worker => write!(f, "worker"),
            ReceiverKind::Storehouse => write!(f, "storehouse"),
        }
    }
}

/// Non-owning handle to a package receiver.
///
/// Preferences hold these instead of references so that registry
/// mutation never invalidates another node's routing table; resolution
/// back to the actual node goes through the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReceiverId {
    /// Which registry the node lives in.
    pub kind: ReceiverKind,
    /// The node's id within that registry.
    pub node: NodeId,
}

impl ReceiverId {
    /// Handle to a worker.
    pub fn worker(node: NodeId) -> Self {
        Self {
            kind: ReceiverKind::Worker,
            node,
        }
    }

    /// Handle to a storehouse.
    pub fn storehouse(node: NodeId) -> Self {
        Self {
            kind: ReceiverKind::Storehouse,
            node,
        }
    }
}

impl fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.node.0)
    }
}
