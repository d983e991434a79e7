//! Keyboard delegate for two-level row/cell grids.
//!
//! Navigation is row-structured rather than geometric: vertical movement
//! steps between rows (preserving the originating column when starting
//! from a cell), horizontal movement steps between sibling cells. The
//! `focus_mode` decides whether arrows land on rows or descend into cells.
//!
//! A grid delegate always needs geometry for paging, so construction fails
//! eagerly without a layout source.

use std::collections::HashSet;

use horizon_aria_core::document::{Document, NodeId};
use horizon_aria_core::error::{AriaError, AriaResult};

use crate::collection::key::Key;
use crate::collection::node::NodeVariant;
use crate::collection::traits::Collection;
use crate::delegate::{Collator, Direction, FocusMode, KeyboardDelegate};
use crate::layout::{DomLayoutDelegate, LayoutDelegate};
use crate::selection::DisabledBehavior;

/// Where a grid delegate gets its geometry.
pub enum GridLayoutSource<'a> {
    /// An explicit layout delegate (virtualized grids).
    Delegate(&'a dyn LayoutDelegate),
    /// A scroll container element to measure through.
    Container(NodeId),
}

enum Layout<'a> {
    Borrowed(&'a dyn LayoutDelegate),
    Dom(DomLayoutDelegate),
}

/// Navigation queries over a row/cell collection.
pub struct GridKeyboardDelegate<'a> {
    collection: &'a dyn Collection,
    disabled_keys: Option<&'a HashSet<Key>>,
    disabled_behavior: DisabledBehavior,
    direction: Direction,
    focus_mode: FocusMode,
    layout: Layout<'a>,
    collator: Option<&'a dyn Collator>,
}

impl<'a> GridKeyboardDelegate<'a> {
    /// Create a delegate over `collection`.
    ///
    /// Fails with [`AriaError::MissingLayout`] when no layout source is
    /// given; a grid without geometry cannot answer paging queries and the
    /// misconfiguration should surface at construction, not mid-keystroke.
    pub fn new(
        collection: &'a dyn Collection,
        layout: Option<GridLayoutSource<'a>>,
    ) -> AriaResult<Self> {
        let layout = match layout {
            Some(GridLayoutSource::Delegate(delegate)) => Layout::Borrowed(delegate),
            Some(GridLayoutSource::Container(node)) => Layout::Dom(DomLayoutDelegate::new(node)),
            None => return Err(AriaError::MissingLayout),
        };
        Ok(Self {
            collection,
            disabled_keys: None,
            disabled_behavior: DisabledBehavior::All,
            direction: Direction::Ltr,
            focus_mode: FocusMode::Row,
            layout,
            collator: None,
        })
    }

    /// Set the reading direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set whether arrows land on rows or cells.
    pub fn with_focus_mode(mut self, focus_mode: FocusMode) -> Self {
        self.focus_mode = focus_mode;
        self
    }

    /// Attach a typeahead collator.
    pub fn with_collator(mut self, collator: &'a dyn Collator) -> Self {
        self.collator = Some(collator);
        self
    }

    /// Exclude the given rows from navigation per `behavior`.
    pub fn with_disabled_keys(
        mut self,
        keys: &'a HashSet<Key>,
        behavior: DisabledBehavior,
    ) -> Self {
        self.disabled_keys = Some(keys);
        self.disabled_behavior = behavior;
        self
    }

    fn layout(&self) -> &dyn LayoutDelegate {
        match &self.layout {
            Layout::Borrowed(delegate) => *delegate,
            Layout::Dom(delegate) => delegate,
        }
    }

    // ========================================================================
    // Row and cell lookups
    // ========================================================================

    /// Disabled filtering applies at row granularity.
    fn skips_row(&self, key: &Key) -> bool {
        let Some(node) = self.collection.item(key) else {
            return true;
        };
        if !node.is_row() {
            return true;
        }
        if self.disabled_behavior != DisabledBehavior::All {
            return false;
        }
        node.is_disabled() || self.disabled_keys.is_some_and(|keys| keys.contains(key))
    }

    fn scan_rows(&self, mut key: Option<Key>, forward: bool) -> Option<Key> {
        while let Some(k) = key {
            let is_row = self.collection.item(&k).is_some_and(|n| n.is_row());
            if is_row && !self.skips_row(&k) {
                return Some(k);
            }
            key = if forward {
                self.collection.key_after(&k)
            } else {
                self.collection.key_before(&k)
            };
        }
        None
    }

    fn next_row(&self, row: &Key) -> Option<Key> {
        self.scan_rows(self.collection.key_after(row), true)
    }

    fn previous_row(&self, row: &Key) -> Option<Key> {
        // Flattened order puts a row's cells after it, so scanning back
        // from the row key lands on the previous row's last cell first.
        self.scan_rows(self.collection.key_before(row), false)
    }

    /// The row a key belongs to: itself for rows, the parent for cells.
    fn row_of(&self, key: &Key) -> Option<Key> {
        let node = self.collection.item(key)?;
        match node.variant() {
            NodeVariant::Row => Some(node.key().clone()),
            NodeVariant::Cell { .. } => node.parent_key().cloned(),
            NodeVariant::Item => None,
        }
    }

    fn first_cell(&self, row: &Key) -> Option<Key> {
        self.collection.children(row).first().cloned()
    }

    fn last_cell(&self, row: &Key) -> Option<Key> {
        self.collection.children(row).last().cloned()
    }

    /// The cell in `row` covering column `col`, clamped to the last cell
    /// for rows narrower than the origin.
    fn cell_at_column(&self, row: &Key, col: usize) -> Option<Key> {
        let children = self.collection.children(row);
        for key in &children {
            if let Some(NodeVariant::Cell { col_index, col_span }) =
                self.collection.item(key).map(|n| n.variant())
                && col >= col_index
                && col < col_index + col_span
            {
                return Some(key.clone());
            }
        }
        children.last().cloned()
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Step to the adjacent row, landing per focus mode and origin shape.
    fn vertical(&self, key: &Key, below: bool) -> Option<Key> {
        let node = self.collection.item(key)?;
        let (row, origin_col) = match node.variant() {
            NodeVariant::Row => (key.clone(), None),
            NodeVariant::Cell { col_index, .. } => (node.parent_key()?.clone(), Some(col_index)),
            NodeVariant::Item => return None,
        };
        let target = if below {
            self.next_row(&row)?
        } else {
            self.previous_row(&row)?
        };
        match (origin_col, self.focus_mode) {
            (Some(col), _) => self.cell_at_column(&target, col),
            (None, FocusMode::Cell) => self.first_cell(&target),
            (None, FocusMode::Row) => Some(target),
        }
    }

    /// Step along the row, `forward` meaning increasing column index.
    fn horizontal(&self, key: &Key, right: bool) -> Option<Key> {
        let forward = (self.direction == Direction::Ltr) == right;
        let node = self.collection.item(key)?;
        match node.variant() {
            // Entering a row from its key lands on an end cell.
            NodeVariant::Row => {
                if forward {
                    self.first_cell(key)
                } else {
                    self.last_cell(key)
                }
            }
            NodeVariant::Cell { .. } => {
                let row = node.parent_key()?.clone();
                let siblings = self.collection.children(&row);
                let index = node.index();
                let next = if forward {
                    siblings.get(index + 1)
                } else {
                    index.checked_sub(1).and_then(|i| siblings.get(i))
                };
                if let Some(next) = next {
                    return Some(next.clone());
                }
                match self.focus_mode {
                    FocusMode::Row => Some(row),
                    FocusMode::Cell => {
                        if forward {
                            self.next_row(&row).and_then(|r| self.first_cell(&r))
                        } else {
                            self.previous_row(&row).and_then(|r| self.last_cell(&r))
                        }
                    }
                }
            }
            NodeVariant::Item => None,
        }
    }

    /// First navigable key, optionally scoped to `from`'s row.
    ///
    /// Without `global`, calling from a cell answers the first cell of the
    /// owning row. Globally (or in cell focus mode) the answer descends
    /// into the first cell of the first row; otherwise it is the row key.
    pub fn first_key_from(
        &self,
        _doc: &Document,
        from: Option<&Key>,
        global: bool,
    ) -> Option<Key> {
        let mut from_cell = false;
        if let Some(key) = from {
            let node = self.collection.item(key)?;
            from_cell = node.is_cell();
            if from_cell && !global {
                return self.first_cell(node.parent_key()?);
            }
        }
        let row = self.scan_rows(self.collection.first_key(), true)?;
        if from_cell || self.focus_mode == FocusMode::Cell {
            return self.first_cell(&row);
        }
        Some(row)
    }

    /// Last navigable key, the mirror of [`Self::first_key_from`].
    pub fn last_key_from(&self, _doc: &Document, from: Option<&Key>, global: bool) -> Option<Key> {
        let mut from_cell = false;
        if let Some(key) = from {
            let node = self.collection.item(key)?;
            from_cell = node.is_cell();
            if from_cell && !global {
                return self.last_cell(node.parent_key()?);
            }
        }
        let row = self.scan_rows(self.collection.last_key(), false)?;
        if from_cell || self.focus_mode == FocusMode::Cell {
            return self.last_cell(&row);
        }
        Some(row)
    }

    /// Page by row-level geometry, then land per origin shape.
    fn page(&self, doc: &Document, key: &Key, below: bool) -> Option<Key> {
        let node = self.collection.item(key)?;
        let origin_col = match node.variant() {
            NodeVariant::Cell { col_index, .. } => Some(col_index),
            _ => None,
        };
        let start_row = self.row_of(key)?;

        let layout = self.layout();
        let view = layout.visible_rect(doc);
        let content = layout.content_size(doc);
        if content.height <= view.height() {
            return if below {
                self.last_key_from(doc, Some(key), true)
            } else {
                self.first_key_from(doc, Some(key), true)
            };
        }

        let start = layout.item_rect(doc, &start_row)?;
        let extent = view.height();
        let step = |row: &Key| {
            if below {
                self.next_row(row)
            } else {
                self.previous_row(row)
            }
        };
        let within_page = |row: &Key| {
            layout.item_rect(doc, row).is_some_and(|rect| {
                if below {
                    rect.max_y() <= start.y() + extent
                } else {
                    rect.y() >= start.max_y() - extent
                }
            })
        };

        let mut current = start_row.clone();
        let mut landed = None;
        while let Some(next) = step(&current) {
            if !within_page(&next) {
                break;
            }
            landed = Some(next.clone());
            current = next;
        }
        let row = landed.or_else(|| step(&start_row))?;
        match (origin_col, self.focus_mode) {
            (Some(col), _) => self.cell_at_column(&row, col),
            (None, FocusMode::Cell) => self.first_cell(&row),
            (None, FocusMode::Row) => Some(row),
        }
    }
}

impl KeyboardDelegate for GridKeyboardDelegate<'_> {
    fn key_below(&self, _doc: &Document, key: &Key) -> Option<Key> {
        self.vertical(key, true)
    }

    fn key_above(&self, _doc: &Document, key: &Key) -> Option<Key> {
        self.vertical(key, false)
    }

    fn key_right_of(&self, _doc: &Document, key: &Key) -> Option<Key> {
        self.horizontal(key, true)
    }

    fn key_left_of(&self, _doc: &Document, key: &Key) -> Option<Key> {
        self.horizontal(key, false)
    }

    fn first_key(&self, doc: &Document) -> Option<Key> {
        self.first_key_from(doc, None, false)
    }

    fn last_key(&self, doc: &Document) -> Option<Key> {
        self.last_key_from(doc, None, false)
    }

    fn key_page_above(&self, doc: &Document, key: &Key) -> Option<Key> {
        self.page(doc, key, false)
    }

    fn key_page_below(&self, doc: &Document, key: &Key) -> Option<Key> {
        self.page(doc, key, true)
    }

    fn key_for_search(&self, _doc: &Document, search: &str, from: Option<&Key>) -> Option<Key> {
        let collator = self.collator?;
        // Re-home to the owning row before stepping forward.
        let mut row = match from {
            Some(from) => self.next_row(&self.row_of(from)?),
            None => self.scan_rows(self.collection.first_key(), true),
        };
        while let Some(r) = row {
            let node = self.collection.item(&r)?;
            if collator.matches_prefix(node.text_value(), search) {
                return match self.focus_mode {
                    FocusMode::Row => Some(r),
                    FocusMode::Cell => self.first_cell(&r),
                };
            }
            row = self.next_row(&r);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::grid::GridCollection;
    use crate::collection::node::CollectionNode;
    use crate::delegate::CaseInsensitiveCollator;
    use crate::layout::CachedLayoutDelegate;
    use horizon_aria_core::geometry::{Rect, Size};

    fn grid_3x2(disabled: &[&str]) -> GridCollection {
        let mut grid = GridCollection::new();
        for (row, text) in [("r0", "Alpha"), ("r1", "Bravo"), ("r2", "Charlie")] {
            let mut node = CollectionNode::row(row, text);
            if disabled.contains(&row) {
                node = node.with_disabled();
            }
            grid.push_row(
                node,
                vec![
                    CollectionNode::cell(format!("{row}c0"), 1),
                    CollectionNode::cell(format!("{row}c1"), 1),
                ],
            );
        }
        grid
    }

    fn key(s: impl Into<Key>) -> Key {
        s.into()
    }

    fn delegate<'a>(
        grid: &'a GridCollection,
        layout: &'a CachedLayoutDelegate,
    ) -> GridKeyboardDelegate<'a> {
        GridKeyboardDelegate::new(grid, Some(GridLayoutSource::Delegate(layout))).unwrap()
    }

    #[test]
    fn test_requires_layout_source() {
        let grid = grid_3x2(&[]);
        let err = GridKeyboardDelegate::new(&grid, None).err();
        assert_eq!(err, Some(AriaError::MissingLayout));
    }

    #[test]
    fn test_right_of_row_enters_first_cell() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout);

        assert_eq!(d.key_right_of(&doc, &key("r0")), Some(key("r0c0")));
        assert_eq!(d.key_left_of(&doc, &key("r0")), Some(key("r0c1")));
        assert_eq!(d.key_right_of(&doc, &key("r0c0")), Some(key("r0c1")));
    }

    #[test]
    fn test_row_boundary_depends_on_focus_mode() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();

        let row_mode = delegate(&grid, &layout);
        assert_eq!(row_mode.key_right_of(&doc, &key("r0c1")), Some(key("r0")));

        let cell_mode = delegate(&grid, &layout).with_focus_mode(FocusMode::Cell);
        assert_eq!(cell_mode.key_right_of(&doc, &key("r0c1")), Some(key("r1c0")));
        assert_eq!(cell_mode.key_left_of(&doc, &key("r1c0")), Some(key("r0c1")));
        assert_eq!(cell_mode.key_left_of(&doc, &key("r0c0")), None);
    }

    #[test]
    fn test_rtl_mirrors_horizontal() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout).with_direction(Direction::Rtl);

        assert_eq!(d.key_right_of(&doc, &key("r0")), Some(key("r0c1")));
        assert_eq!(d.key_right_of(&doc, &key("r0c1")), Some(key("r0c0")));
        assert_eq!(d.key_left_of(&doc, &key("r0c0")), Some(key("r0c1")));
    }

    #[test]
    fn test_below_preserves_column() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout);

        assert_eq!(d.key_below(&doc, &key("r0c1")), Some(key("r1c1")));
        assert_eq!(d.key_above(&doc, &key("r1c1")), Some(key("r0c1")));
        assert_eq!(d.key_below(&doc, &key("r0")), Some(key("r1")));
        assert_eq!(d.key_above(&doc, &key("r0")), None);
    }

    #[test]
    fn test_below_from_row_in_cell_mode_enters_first_cell() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout).with_focus_mode(FocusMode::Cell);

        assert_eq!(d.key_below(&doc, &key("r0")), Some(key("r1c0")));
    }

    #[test]
    fn test_disabled_rows_skipped() {
        let doc = Document::new();
        let grid = grid_3x2(&["r1"]);
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout);

        assert_eq!(d.key_below(&doc, &key("r0")), Some(key("r2")));
        assert_eq!(d.key_above(&doc, &key("r2c0")), Some(key("r0c0")));

        // Selection-only disabling leaves navigation alone.
        let disabled: HashSet<Key> = [key("r1")].into();
        let d = delegate(&grid, &layout).with_disabled_keys(&disabled, DisabledBehavior::Selection);
        assert_eq!(d.key_below(&doc, &key("r0")), Some(key("r1")));
    }

    #[test]
    fn test_column_preserved_across_spans() {
        let doc = Document::new();
        let mut grid = GridCollection::new();
        grid.push_row(
            CollectionNode::row("r0", ""),
            vec![CollectionNode::cell("wide", 2), CollectionNode::cell("r0c2", 1)],
        );
        grid.push_row(
            CollectionNode::row("r1", ""),
            vec![
                CollectionNode::cell("r1c0", 1),
                CollectionNode::cell("r1c1", 1),
                CollectionNode::cell("r1c2", 1),
            ],
        );
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout);

        // The wide cell starts at column 0; below lands in column 0.
        assert_eq!(d.key_below(&doc, &key("wide")), Some(key("r1c0")));
        // Column 1 going up lands inside the spanning cell.
        assert_eq!(d.key_above(&doc, &key("r1c1")), Some(key("wide")));
        assert_eq!(d.key_above(&doc, &key("r1c2")), Some(key("r0c2")));
    }

    #[test]
    fn test_first_and_last_key_scoping() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();
        let d = delegate(&grid, &layout);

        assert_eq!(d.first_key(&doc), Some(key("r0")));
        assert_eq!(d.last_key(&doc), Some(key("r2")));
        // From a cell, non-global answers stay within the row.
        assert_eq!(d.first_key_from(&doc, Some(&key("r1c1")), false), Some(key("r1c0")));
        assert_eq!(d.last_key_from(&doc, Some(&key("r1c0")), false), Some(key("r1c1")));
        // Global answers descend into the collection's corner cells.
        assert_eq!(d.first_key_from(&doc, Some(&key("r1c1")), true), Some(key("r0c0")));
        assert_eq!(d.last_key_from(&doc, Some(&key("r1c0")), true), Some(key("r2c1")));

        let cell_mode = delegate(&grid, &layout).with_focus_mode(FocusMode::Cell);
        assert_eq!(cell_mode.first_key(&doc), Some(key("r0c0")));
        assert_eq!(cell_mode.last_key(&doc), Some(key("r2c1")));
    }

    #[test]
    fn test_paging_by_row_geometry() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let mut layout = CachedLayoutDelegate::new();
        for (i, row) in ["r0", "r1", "r2"].into_iter().enumerate() {
            layout.set_rect(row, Rect::new(0.0, i as f32 * 40.0, 100.0, 40.0));
        }
        layout.set_visible_rect(Rect::new(0.0, 0.0, 100.0, 80.0));
        layout.set_content_size(Size::new(100.0, 120.0));
        let d = delegate(&grid, &layout);

        // One page (80px) below r0 ends at r1.
        assert_eq!(d.key_page_below(&doc, &key("r0")), Some(key("r1")));
        assert_eq!(d.key_page_above(&doc, &key("r2")), Some(key("r1")));
        // Paging from a cell lands on the same column in the target row.
        assert_eq!(d.key_page_below(&doc, &key("r0c1")), Some(key("r1c1")));
    }

    #[test]
    fn test_paging_without_scrolling_jumps_to_ends() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let mut layout = CachedLayoutDelegate::new();
        layout.set_visible_rect(Rect::new(0.0, 0.0, 100.0, 200.0));
        layout.set_content_size(Size::new(100.0, 120.0));
        let d = delegate(&grid, &layout);

        assert_eq!(d.key_page_below(&doc, &key("r0")), Some(key("r2")));
        assert_eq!(d.key_page_above(&doc, &key("r2c1")), Some(key("r0c0")));
    }

    #[test]
    fn test_search_matches_row_text() {
        let doc = Document::new();
        let grid = grid_3x2(&[]);
        let layout = CachedLayoutDelegate::new();
        let collator = CaseInsensitiveCollator;
        let d = delegate(&grid, &layout).with_collator(&collator);

        assert_eq!(d.key_for_search(&doc, "br", None), Some(key("r1")));
        // Searching from a cell re-homes to its row and moves on.
        assert_eq!(d.key_for_search(&doc, "ch", Some(&key("r0c1"))), Some(key("r2")));
        assert_eq!(d.key_for_search(&doc, "zz", None), None);

        let cell_mode = delegate(&grid, &layout)
            .with_focus_mode(FocusMode::Cell)
            .with_collator(&collator);
        assert_eq!(cell_mode.key_for_search(&doc, "br", None), Some(key("r1c0")));
    }
}
