//! Keyboard delegate for flat lists.
//!
//! Handles one-dimensional stacks and wrapped "grid of items" layouts.
//! Linear movement follows collection order; grid layouts answer
//! above/below by walking document order until the candidate leaves the
//! starting item's row (or column, for horizontal grids), using the layout
//! delegate's rectangles.

use std::collections::HashSet;

use horizon_aria_core::document::Document;

use crate::collection::key::Key;
use crate::collection::node::NodeVariant;
use crate::collection::traits::Collection;
use crate::delegate::{Collator, Direction, KeyboardDelegate, Orientation};
use crate::layout::LayoutDelegate;
use crate::selection::DisabledBehavior;

/// How list items are laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListLayout {
    /// One item per line along the main axis.
    #[default]
    Stack,
    /// Items wrap into a grid; vertical movement is geometric.
    Grid,
}

/// Navigation queries over a flat collection.
pub struct ListKeyboardDelegate<'a> {
    collection: &'a dyn Collection,
    disabled_keys: Option<&'a HashSet<Key>>,
    disabled_behavior: DisabledBehavior,
    layout: ListLayout,
    orientation: Orientation,
    direction: Direction,
    layout_delegate: Option<&'a dyn LayoutDelegate>,
    collator: Option<&'a dyn Collator>,
}

impl<'a> ListKeyboardDelegate<'a> {
    /// Create a delegate over `collection` with stack layout defaults.
    pub fn new(collection: &'a dyn Collection) -> Self {
        Self {
            collection,
            disabled_keys: None,
            disabled_behavior: DisabledBehavior::All,
            layout: ListLayout::Stack,
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            layout_delegate: None,
            collator: None,
        }
    }

    /// Set the on-screen layout.
    pub fn with_layout(mut self, layout: ListLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the main axis.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the reading direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Attach a geometry source.
    pub fn with_layout_delegate(mut self, delegate: &'a dyn LayoutDelegate) -> Self {
        self.layout_delegate = Some(delegate);
        self
    }

    /// Attach a typeahead collator.
    pub fn with_collator(mut self, collator: &'a dyn Collator) -> Self {
        self.collator = Some(collator);
        self
    }

    /// Exclude the given keys from navigation per `behavior`.
    pub fn with_disabled_keys(
        mut self,
        keys: &'a HashSet<Key>,
        behavior: DisabledBehavior,
    ) -> Self {
        self.disabled_keys = Some(keys);
        self.disabled_behavior = behavior;
        self
    }

    fn skips(&self, key: &Key) -> bool {
        let Some(node) = self.collection.item(key) else {
            return true;
        };
        if node.variant() != NodeVariant::Item {
            return true;
        }
        if self.disabled_behavior != DisabledBehavior::All {
            return false;
        }
        node.is_disabled() || self.disabled_keys.is_some_and(|keys| keys.contains(key))
    }

    fn scan(&self, mut key: Option<Key>, forward: bool) -> Option<Key> {
        while let Some(k) = key {
            if !self.skips(&k) {
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

    /// Next navigable key in collection order.
    pub fn next_key(&self, key: &Key) -> Option<Key> {
        self.scan(self.collection.key_after(key), true)
    }

    /// Previous navigable key in collection order.
    pub fn previous_key(&self, key: &Key) -> Option<Key> {
        self.scan(self.collection.key_before(key), false)
    }

    /// Step along the cross axis of a grid layout: walk collection order
    /// until the candidate leaves the starting item's row (column for
    /// horizontal orientation).
    fn grid_cross_axis(&self, doc: &Document, key: &Key, forward: bool) -> Option<Key> {
        let layout = self.layout_delegate?;
        let start = layout.item_rect(doc, key)?;
        let mut candidate = if forward {
            self.next_key(key)
        } else {
            self.previous_key(key)
        };
        while let Some(k) = candidate {
            let rect = layout.item_rect(doc, &k)?;
            let same_line = match self.orientation {
                Orientation::Vertical => rect.y() == start.y() || rect.x() != start.x(),
                Orientation::Horizontal => rect.x() == start.x() || rect.y() != start.y(),
            };
            if !same_line {
                return Some(k);
            }
            candidate = if forward {
                self.next_key(&k)
            } else {
                self.previous_key(&k)
            };
        }
        None
    }

    /// Prefer the layout's geometric neighbor lookup, skipping disabled
    /// candidates by repeated lookup.
    fn geometric_horizontal(&self, doc: &Document, key: &Key, right: bool) -> Option<Option<Key>> {
        let layout = self.layout_delegate?;
        // Probe once to see whether the layout answers at all.
        let lookup = |k: &Key| {
            if right {
                layout.key_right_of(doc, k)
            } else {
                layout.key_left_of(doc, k)
            }
        };
        let mut candidate = lookup(key)?;
        loop {
            if !self.skips(&candidate) {
                return Some(Some(candidate));
            }
            match lookup(&candidate) {
                Some(next) => candidate = next,
                None => return Some(None),
            }
        }
    }

    /// Step in reading order: for RTL, "right" means the previous key.
    fn directional(&self, key: &Key, right: bool) -> Option<Key> {
        let forward = match self.direction {
            Direction::Ltr => right,
            Direction::Rtl => !right,
        };
        if forward {
            self.next_key(key)
        } else {
            self.previous_key(key)
        }
    }

    fn page(&self, doc: &Document, key: &Key, below: bool) -> Option<Key> {
        let Some(layout) = self.layout_delegate else {
            return if below {
                self.last_key(doc)
            } else {
                self.first_key(doc)
            };
        };
        let start = layout.item_rect(doc, key)?;
        let view = layout.visible_rect(doc);
        let content = layout.content_size(doc);
        let (extent, scrollable) = match self.orientation {
            Orientation::Vertical => (view.height(), content.height > view.height()),
            Orientation::Horizontal => (view.width(), content.width > view.width()),
        };
        if !scrollable {
            return if below {
                self.last_key(doc)
            } else {
                self.first_key(doc)
            };
        }

        let step = |k: &Key| {
            if below {
                self.key_below(doc, k)
            } else {
                self.key_above(doc, k)
            }
        };
        let within_page = |k: &Key| {
            layout.item_rect(doc, k).is_some_and(|rect| match self.orientation {
                Orientation::Vertical => {
                    if below {
                        rect.max_y() <= start.y() + extent
                    } else {
                        rect.y() >= start.max_y() - extent
                    }
                }
                Orientation::Horizontal => {
                    if below {
                        rect.max_x() <= start.x() + extent
                    } else {
                        rect.x() >= start.max_x() - extent
                    }
                }
            })
        };

        let mut current = key.clone();
        let mut landed = None;
        while let Some(next) = step(&current) {
            if !within_page(&next) {
                break;
            }
            landed = Some(next.clone());
            current = next;
        }
        // Always move at least one item when possible.
        landed.or_else(|| step(key))
    }
}

impl KeyboardDelegate for ListKeyboardDelegate<'_> {
    fn key_below(&self, doc: &Document, key: &Key) -> Option<Key> {
        match (self.orientation, self.layout) {
            (Orientation::Vertical, ListLayout::Stack) => self.next_key(key),
            (Orientation::Vertical, ListLayout::Grid) => self.grid_cross_axis(doc, key, true),
            (Orientation::Horizontal, ListLayout::Grid) => self.next_key(key),
            (Orientation::Horizontal, ListLayout::Stack) => None,
        }
    }

    fn key_above(&self, doc: &Document, key: &Key) -> Option<Key> {
        match (self.orientation, self.layout) {
            (Orientation::Vertical, ListLayout::Stack) => self.previous_key(key),
            (Orientation::Vertical, ListLayout::Grid) => self.grid_cross_axis(doc, key, false),
            (Orientation::Horizontal, ListLayout::Grid) => self.previous_key(key),
            (Orientation::Horizontal, ListLayout::Stack) => None,
        }
    }

    fn key_right_of(&self, doc: &Document, key: &Key) -> Option<Key> {
        if let Some(answer) = self.geometric_horizontal(doc, key, true) {
            return answer;
        }
        match (self.orientation, self.layout) {
            // A vertical stack has no horizontal axis.
            (Orientation::Vertical, ListLayout::Stack) => None,
            (Orientation::Horizontal, ListLayout::Grid) => self.grid_cross_axis(
                doc,
                key,
                self.direction == Direction::Ltr,
            ),
            _ => self.directional(key, true),
        }
    }

    fn key_left_of(&self, doc: &Document, key: &Key) -> Option<Key> {
        if let Some(answer) = self.geometric_horizontal(doc, key, false) {
            return answer;
        }
        match (self.orientation, self.layout) {
            (Orientation::Vertical, ListLayout::Stack) => None,
            (Orientation::Horizontal, ListLayout::Grid) => self.grid_cross_axis(
                doc,
                key,
                self.direction == Direction::Rtl,
            ),
            _ => self.directional(key, false),
        }
    }

    fn first_key(&self, _doc: &Document) -> Option<Key> {
        self.scan(self.collection.first_key(), true)
    }

    fn last_key(&self, _doc: &Document) -> Option<Key> {
        self.scan(self.collection.last_key(), false)
    }

    fn key_page_above(&self, doc: &Document, key: &Key) -> Option<Key> {
        self.page(doc, key, false)
    }

    fn key_page_below(&self, doc: &Document, key: &Key) -> Option<Key> {
        self.page(doc, key, true)
    }

    fn key_for_search(&self, _doc: &Document, search: &str, from: Option<&Key>) -> Option<Key> {
        let collator = self.collator?;
        let mut key = match from {
            Some(from) => self.collection.key_after(from),
            None => self.collection.first_key(),
        };
        while let Some(k) = key {
            if !self.skips(&k) {
                let node = self.collection.item(&k)?;
                if collator.matches_prefix(node.text_value(), search) {
                    return Some(k);
                }
            }
            key = self.collection.key_after(&k);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::list::ListCollection;
    use crate::collection::node::CollectionNode;
    use crate::delegate::CaseInsensitiveCollator;
    use crate::layout::CachedLayoutDelegate;
    use horizon_aria_core::geometry::{Rect, Size};

    fn letters(disabled: &[&str]) -> ListCollection {
        ["a", "b", "c", "d"]
            .into_iter()
            .map(|k| {
                let node = CollectionNode::item(k, k.to_uppercase());
                if disabled.contains(&k) {
                    node.with_disabled()
                } else {
                    node
                }
            })
            .collect()
    }

    #[test]
    fn test_disabled_skipping() {
        let doc = Document::new();
        let list = letters(&["a", "c"]);
        let delegate = ListKeyboardDelegate::new(&list);

        assert_eq!(delegate.first_key(&doc), Some(Key::from("b")));
        assert_eq!(delegate.last_key(&doc), Some(Key::from("d")));
        assert_eq!(delegate.next_key(&Key::from("b")), Some(Key::from("d")));
        assert_eq!(delegate.previous_key(&Key::from("d")), Some(Key::from("b")));
    }

    #[test]
    fn test_disabled_keys_set() {
        let doc = Document::new();
        let list = letters(&[]);
        let disabled: HashSet<Key> = [Key::from("b")].into();
        let delegate =
            ListKeyboardDelegate::new(&list).with_disabled_keys(&disabled, DisabledBehavior::All);
        assert_eq!(delegate.key_below(&doc, &Key::from("a")), Some(Key::from("c")));

        // Selection-only disabling leaves navigation alone.
        let delegate = ListKeyboardDelegate::new(&list)
            .with_disabled_keys(&disabled, DisabledBehavior::Selection);
        assert_eq!(delegate.key_below(&doc, &Key::from("a")), Some(Key::from("b")));
    }

    #[test]
    fn test_vertical_stack_has_no_horizontal_axis() {
        let doc = Document::new();
        let list = letters(&[]);
        let delegate = ListKeyboardDelegate::new(&list);
        assert_eq!(delegate.key_right_of(&doc, &Key::from("a")), None);
        assert_eq!(delegate.key_left_of(&doc, &Key::from("b")), None);
    }

    #[test]
    fn test_horizontal_stack_mirrors_rtl() {
        let doc = Document::new();
        let list = letters(&[]);
        let ltr = ListKeyboardDelegate::new(&list).with_orientation(Orientation::Horizontal);
        assert_eq!(ltr.key_right_of(&doc, &Key::from("a")), Some(Key::from("b")));
        assert_eq!(ltr.key_below(&doc, &Key::from("a")), None);

        let rtl = ListKeyboardDelegate::new(&list)
            .with_orientation(Orientation::Horizontal)
            .with_direction(Direction::Rtl);
        assert_eq!(rtl.key_right_of(&doc, &Key::from("b")), Some(Key::from("a")));
        assert_eq!(rtl.key_left_of(&doc, &Key::from("a")), Some(Key::from("b")));
    }

    /// Two-column wrapped grid:
    /// ```text
    /// a b
    /// c d
    /// ```
    fn wrapped_grid_layout() -> CachedLayoutDelegate {
        let mut cache = CachedLayoutDelegate::new();
        cache.set_rect("a", Rect::new(0.0, 0.0, 50.0, 20.0));
        cache.set_rect("b", Rect::new(50.0, 0.0, 50.0, 20.0));
        cache.set_rect("c", Rect::new(0.0, 20.0, 50.0, 20.0));
        cache.set_rect("d", Rect::new(50.0, 20.0, 50.0, 20.0));
        cache.set_visible_rect(Rect::new(0.0, 0.0, 100.0, 40.0));
        cache.set_content_size(Size::new(100.0, 40.0));
        cache
    }

    #[test]
    fn test_grid_layout_vertical_movement() {
        let doc = Document::new();
        let list = letters(&[]);
        let cache = wrapped_grid_layout();
        let delegate = ListKeyboardDelegate::new(&list)
            .with_layout(ListLayout::Grid)
            .with_layout_delegate(&cache);

        assert_eq!(delegate.key_below(&doc, &Key::from("a")), Some(Key::from("c")));
        assert_eq!(delegate.key_below(&doc, &Key::from("b")), Some(Key::from("d")));
        assert_eq!(delegate.key_above(&doc, &Key::from("d")), Some(Key::from("b")));
        assert_eq!(delegate.key_below(&doc, &Key::from("c")), None);
    }

    #[test]
    fn test_geometric_horizontal_preferred() {
        let doc = Document::new();
        let list = letters(&[]);
        let cache = wrapped_grid_layout();
        let delegate = ListKeyboardDelegate::new(&list)
            .with_layout(ListLayout::Grid)
            .with_layout_delegate(&cache);

        assert_eq!(delegate.key_right_of(&doc, &Key::from("a")), Some(Key::from("b")));
        assert_eq!(delegate.key_left_of(&doc, &Key::from("d")), Some(Key::from("c")));
        assert_eq!(delegate.key_left_of(&doc, &Key::from("a")), None);
    }

    #[test]
    fn test_paging_without_scrolling_jumps_to_ends() {
        let doc = Document::new();
        let list = letters(&[]);
        let cache = wrapped_grid_layout();
        let delegate = ListKeyboardDelegate::new(&list).with_layout_delegate(&cache);

        assert_eq!(delegate.key_page_below(&doc, &Key::from("a")), Some(Key::from("d")));
        assert_eq!(delegate.key_page_above(&doc, &Key::from("d")), Some(Key::from("a")));
    }

    #[test]
    fn test_paging_steps_one_viewport() {
        let doc = Document::new();
        let list = letters(&[]);
        let mut cache = CachedLayoutDelegate::new();
        for (i, k) in ["a", "b", "c", "d"].into_iter().enumerate() {
            cache.set_rect(k, Rect::new(0.0, i as f32 * 40.0, 100.0, 40.0));
        }
        cache.set_visible_rect(Rect::new(0.0, 0.0, 100.0, 80.0));
        cache.set_content_size(Size::new(100.0, 160.0));
        let delegate = ListKeyboardDelegate::new(&list).with_layout_delegate(&cache);

        // One page (80px) below `a` ends at `b`; below `b` ends at `c`.
        assert_eq!(delegate.key_page_below(&doc, &Key::from("a")), Some(Key::from("b")));
        assert_eq!(delegate.key_page_below(&doc, &Key::from("b")), Some(Key::from("c")));
        assert_eq!(delegate.key_page_above(&doc, &Key::from("d")), Some(Key::from("c")));
    }

    #[test]
    fn test_search() {
        let doc = Document::new();
        let list: ListCollection = [("a", "Alpha"), ("b", "Bravo"), ("c", "Charlie")]
            .into_iter()
            .map(|(k, text)| CollectionNode::item(k, text))
            .collect();
        let collator = CaseInsensitiveCollator;
        let delegate = ListKeyboardDelegate::new(&list).with_collator(&collator);

        assert_eq!(
            delegate.key_for_search(&doc, "br", None),
            Some(Key::from("b"))
        );
        assert_eq!(
            delegate.key_for_search(&doc, "ch", Some(&Key::from("b"))),
            Some(Key::from("c"))
        );
        assert_eq!(delegate.key_for_search(&doc, "zz", None), None);

        // No collator: search is inert.
        let without = ListKeyboardDelegate::new(&list);
        assert_eq!(without.key_for_search(&doc, "br", None), None);
    }
}
