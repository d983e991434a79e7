//! Geometry sources for keyboard navigation.
//!
//! Delegates answer "where is this item on screen" so navigation can make
//! row, column, and paging decisions. Exactly one implementation backs a
//! delegate instance:
//!
//! - [`DomLayoutDelegate`] measures through the document, locating items
//!   by their `data-key` attribute and reading the rects the host's layout
//!   pass recorded.
//! - [`CachedLayoutDelegate`] serves rects from an explicit cache, the
//!   shape virtualized layouts use when most items have no live element.
//!
//! Missing geometry is an expected absence: `item_rect` returns `None` and
//! navigation falls back to collection order.

use std::collections::HashMap;

use horizon_aria_core::document::{Document, NodeId};
use horizon_aria_core::geometry::{Point, Rect, Size};
use horizon_aria_core::logging::targets;

use crate::collection::key::Key;

/// Supplies item and viewport geometry for a collection.
pub trait LayoutDelegate {
    /// On-screen rectangle for an item, if it has one.
    fn item_rect(&self, doc: &Document, key: &Key) -> Option<Rect>;

    /// Total scrollable content size.
    fn content_size(&self, doc: &Document) -> Size;

    /// The currently visible rectangle of the scroll container.
    fn visible_rect(&self, doc: &Document) -> Rect;

    /// Geometric left neighbor, when the layout can answer directly.
    fn key_left_of(&self, _doc: &Document, _key: &Key) -> Option<Key> {
        None
    }

    /// Geometric right neighbor, when the layout can answer directly.
    fn key_right_of(&self, _doc: &Document, _key: &Key) -> Option<Key> {
        None
    }
}

/// Measures geometry live from the document.
#[derive(Debug, Clone, Copy)]
pub struct DomLayoutDelegate {
    container: NodeId,
}

impl DomLayoutDelegate {
    /// Create a delegate reading from `container`'s subtree.
    pub fn new(container: NodeId) -> Self {
        Self { container }
    }

    /// The scroll container element.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Locate the element rendering an item.
    pub fn item_element(&self, doc: &Document, key: &Key) -> Option<NodeId> {
        let node = doc.element_by_data_key(&key.to_string())?;
        doc.contains(self.container, node).then_some(node)
    }
}

impl LayoutDelegate for DomLayoutDelegate {
    fn item_rect(&self, doc: &Document, key: &Key) -> Option<Rect> {
        let node = self.item_element(doc, key)?;
        doc.get(node)?.rect()
    }

    fn content_size(&self, doc: &Document) -> Size {
        doc.get(self.container)
            .map(|e| e.content_size())
            .unwrap_or(Size::ZERO)
    }

    fn visible_rect(&self, doc: &Document) -> Rect {
        doc.get(self.container)
            .and_then(|e| e.rect())
            .unwrap_or(Rect::ZERO)
    }
}

/// Serves geometry from an explicit rect cache.
///
/// Horizontal neighbors are answered geometrically: the nearest cached
/// rect to the left/right whose vertical extent overlaps the item's.
#[derive(Debug, Clone, Default)]
pub struct CachedLayoutDelegate {
    rects: HashMap<Key, Rect>,
    content_size: Size,
    visible_rect: Rect,
}

impl CachedLayoutDelegate {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item's rectangle.
    pub fn set_rect(&mut self, key: impl Into<Key>, rect: Rect) {
        self.rects.insert(key.into(), rect);
    }

    /// Record the total content size.
    pub fn set_content_size(&mut self, size: Size) {
        self.content_size = size;
    }

    /// Record the visible rectangle.
    pub fn set_visible_rect(&mut self, rect: Rect) {
        self.visible_rect = rect;
    }

    fn horizontal_neighbor(&self, key: &Key, left: bool) -> Option<Key> {
        let rect = *self.rects.get(key)?;
        let overlaps = |other: &Rect| other.y() < rect.max_y() && rect.y() < other.max_y();
        self.rects
            .iter()
            .filter(|(k, r)| *k != key && overlaps(r))
            .filter(|(_, r)| if left { r.max_x() <= rect.x() } else { r.x() >= rect.max_x() })
            .min_by(|(_, a), (_, b)| {
                let da = if left { rect.x() - a.max_x() } else { a.x() - rect.max_x() };
                let db = if left { rect.x() - b.max_x() } else { b.x() - rect.max_x() };
                da.total_cmp(&db)
            })
            .map(|(k, _)| k.clone())
    }
}

impl LayoutDelegate for CachedLayoutDelegate {
    fn item_rect(&self, _doc: &Document, key: &Key) -> Option<Rect> {
        self.rects.get(key).copied()
    }

    fn content_size(&self, _doc: &Document) -> Size {
        self.content_size
    }

    fn visible_rect(&self, _doc: &Document) -> Rect {
        self.visible_rect
    }

    fn key_left_of(&self, _doc: &Document, key: &Key) -> Option<Key> {
        self.horizontal_neighbor(key, true)
    }

    fn key_right_of(&self, _doc: &Document, key: &Key) -> Option<Key> {
        self.horizontal_neighbor(key, false)
    }
}

/// Scroll `container` the minimum amount needed to bring `target` into its
/// visible rectangle (block-nearest behavior). No-op when the container
/// has no recorded rect.
pub fn scroll_into_view(doc: &mut Document, container: NodeId, target: Rect) {
    let Some(element) = doc.get(container) else {
        return;
    };
    let Some(view) = element.rect() else {
        return;
    };
    let content = element.content_size();
    let mut scroll = element.scroll();

    if target.y() < view.y() {
        scroll.y -= view.y() - target.y();
    } else if target.max_y() > view.max_y() {
        scroll.y += target.max_y() - view.max_y();
    }
    if target.x() < view.x() {
        scroll.x -= view.x() - target.x();
    } else if target.max_x() > view.max_x() {
        scroll.x += target.max_x() - view.max_x();
    }
    scroll.y = scroll.y.clamp(0.0, (content.height - view.height()).max(0.0));
    scroll.x = scroll.x.clamp(0.0, (content.width - view.width()).max(0.0));
    tracing::trace!(target: targets::DELEGATE, ?container, x = scroll.x, y = scroll.y, "scrolled into view");
    doc.set_scroll(container, Point::new(scroll.x, scroll.y));
}
