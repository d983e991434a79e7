//! The read-only collection contract.

use crate::collection::key::Key;
use crate::collection::node::CollectionNode;

/// Ordered, read-only sequence of collection nodes.
///
/// Keys iterate in flattened document order: for grids, a row precedes its
/// cells, which precede the next row. Lookup by key is expected to be
/// cheap; delegates call these methods on every navigation keystroke.
pub trait Collection {
    /// Look up a node by key.
    fn item(&self, key: &Key) -> Option<&CollectionNode>;

    /// First key in flattened order.
    fn first_key(&self) -> Option<Key>;

    /// Last key in flattened order.
    fn last_key(&self) -> Option<Key>;

    /// The key immediately before `key` in flattened order.
    fn key_before(&self, key: &Key) -> Option<Key>;

    /// The key immediately after `key` in flattened order.
    fn key_after(&self, key: &Key) -> Option<Key>;

    /// Child keys of a row, in column order. Empty for non-rows.
    fn children(&self, key: &Key) -> Vec<Key>;

    /// Number of nodes in flattened order.
    fn len(&self) -> usize;

    /// Whether the collection holds no nodes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
