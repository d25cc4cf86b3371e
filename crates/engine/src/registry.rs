//! Stable-identity node registries.

use indexmap::IndexMap;
use netsim_types::NodeId;

/// Anything stored in a [`NodeCollection`].
pub trait Identifiable {
    /// The node's registry key.
    fn id(&self) -> NodeId;
}

/// Registry for one node variant.
///
/// Nodes are keyed by id, so handles held elsewhere (receiver
/// preferences, external reports) survive arbitrary add/remove churn
/// on other nodes. Iteration follows insertion order and is stable
/// within a round, which fixes the per-phase processing order.
#[derive(Debug)]
pub struct NodeCollection<N> {
    nodes: IndexMap<NodeId, N>,
}

impl<N: Identifiable> NodeCollection<N> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }

    /// Take ownership of a node. Ids are assumed unique per registry;
    /// inserting a duplicate replaces the previous node.
    pub fn add(&mut self, node: N) {
        self.nodes.insert(node.id(), node);
    }

    /// Erase a node by id. Unknown ids are a no-op. Preserves the
    /// iteration order of the remaining nodes.
    pub fn remove_by_id(&mut self, id: NodeId) {
        self.nodes.shift_remove(&id);
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&N> {
        self.nodes.get(&id)
    }

    /// Look up a node by id, mutably.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(&id)
    }

    /// Whether a node with this id is registered.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }

    /// Iterate nodes in insertion order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut N> {
        self.nodes.values_mut()
    }

    /// Registered ids in insertion order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<N: Identifiable> Default for NodeCollection<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestNode {
        id: NodeId,
    }

    impl Identifiable for TestNode {
        fn id(&self) -> NodeId {
            self.id
        }
    }

    #[test]
    fn test_add_find_remove() {
        let mut collection = NodeCollection::new();
        collection.add(TestNode { id: NodeId(1) });
        collection.add(TestNode { id: NodeId(2) });

        assert_eq!(collection.len(), 2);
        assert!(collection.get(NodeId(1)).is_some());
        assert!(collection.get(NodeId(3)).is_none());

        collection.remove_by_id(NodeId(1));
        assert!(!collection.contains(NodeId(1)));

        // Removing an unknown id is idempotent.
        collection.remove_by_id(NodeId(1));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_removal_preserves_iteration_order() {
        let mut collection = NodeCollection::new();
        for id in [5, 3, 8, 1] {
            collection.add(TestNode { id: NodeId(id) });
        }

        collection.remove_by_id(NodeId(3));

        let order: Vec<_> = collection.iter().map(|n| n.id().0).collect();
        assert_eq!(order, vec![5, 8, 1]);
    }
}
