//! Two-level row/cell collection.

use std::collections::HashMap;

use crate::collection::key::Key;
use crate::collection::node::{CollectionNode, NodeVariant};
use crate::collection::traits::Collection;

/// An ordered snapshot of rows and their cells.
///
/// Flattened order interleaves rows with their cells: row 0, its cells,
/// row 1, its cells, and so on.
#[derive(Debug, Clone, Default)]
pub struct GridCollection {
    flat: Vec<CollectionNode>,
    index: HashMap<Key, usize>,
    children: HashMap<Key, Vec<Key>>,
    row_keys: Vec<Key>,
}

impl GridCollection {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row with its cells in column order.
    ///
    /// Column indices are accumulated over the cells' spans; parent keys
    /// and sibling indices are assigned here.
    pub fn push_row(&mut self, mut row: CollectionNode, cells: Vec<CollectionNode>) {
        row.variant = NodeVariant::Row;
        row.index = self.row_keys.len();
        let row_key = row.key.clone();
        self.row_keys.push(row_key.clone());
        self.index.insert(row_key.clone(), self.flat.len());
        self.flat.push(row);

        let mut col = 0;
        let mut child_keys = Vec::with_capacity(cells.len());
        for (i, mut cell) in cells.into_iter().enumerate() {
            let span = match cell.variant {
                NodeVariant::Cell { col_span, .. } => col_span,
                _ => 1,
            };
            cell.variant = NodeVariant::Cell {
                col_index: col,
                col_span: span,
            };
            col += span;
            cell.parent_key = Some(row_key.clone());
            cell.index = i;
            child_keys.push(cell.key.clone());
            self.index.insert(cell.key.clone(), self.flat.len());
            self.flat.push(cell);
        }
        self.children.insert(row_key, child_keys);
    }

    /// Row keys in display order.
    pub fn rows(&self) -> &[Key] {
        &self.row_keys
    }
}

impl Collection for GridCollection {
    fn item(&self, key: &Key) -> Option<&CollectionNode> {
        self.index.get(key).map(|&i| &self.flat[i])
    }

    fn first_key(&self) -> Option<Key> {
        self.flat.first().map(|n| n.key.clone())
    }

    fn last_key(&self) -> Option<Key> {
        self.flat.last().map(|n| n.key.clone())
    }

    fn key_before(&self, key: &Key) -> Option<Key> {
        let i = *self.index.get(key)?;
        i.checked_sub(1).map(|i| self.flat[i].key.clone())
    }

    fn key_after(&self, key: &Key) -> Option<Key> {
        let i = *self.index.get(key)?;
        self.flat.get(i + 1).map(|n| n.key.clone())
    }

    fn children(&self, key: &Key) -> Vec<Key> {
        self.children.get(key).cloned().unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.flat.len()
    }
}
