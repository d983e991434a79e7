//! Flat list collection.

use std::collections::HashMap;

use crate::collection::key::Key;
use crate::collection::node::CollectionNode;
use crate::collection::traits::Collection;

/// An ordered snapshot of flat items.
#[derive(Debug, Clone, Default)]
pub struct ListCollection {
    nodes: Vec<CollectionNode>,
    index: HashMap<Key, usize>,
}

impl ListCollection {
    /// Build a list from nodes in display order.
    ///
    /// Sibling indices are assigned from the given order.
    pub fn new(mut nodes: Vec<CollectionNode>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter_mut().enumerate() {
            node.index = i;
            index.insert(node.key.clone(), i);
        }
        Self { nodes, index }
    }

    /// Iterate nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionNode> {
        self.nodes.iter()
    }
}

impl FromIterator<CollectionNode> for ListCollection {
    fn from_iter<T: IntoIterator<Item = CollectionNode>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Collection for ListCollection {
    fn item(&self, key: &Key) -> Option<&CollectionNode> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    fn first_key(&self) -> Option<Key> {
        self.nodes.first().map(|n| n.key.clone())
    }

    fn last_key(&self) -> Option<Key> {
        self.nodes.last().map(|n| n.key.clone())
    }

    fn key_before(&self, key: &Key) -> Option<Key> {
        let i = *self.index.get(key)?;
        i.checked_sub(1).map(|i| self.nodes[i].key.clone())
    }

    fn key_after(&self, key: &Key) -> Option<Key> {
        let i = *self.index.get(key)?;
        self.nodes.get(i + 1).map(|n| n.key.clone())
    }

    fn children(&self, _key: &Key) -> Vec<Key> {
        Vec::new()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
