//! Collection node type.

use crate::collection::key::Key;

/// What a node is, carrying only the fields valid for that shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeVariant {
    /// A flat list item.
    Item,
    /// A grid row containing cells.
    Row,
    /// A grid cell within a row.
    Cell {
        /// Leading column index, accumulated over preceding spans.
        col_index: usize,
        /// Number of columns this cell occupies.
        col_span: usize,
    },
}

/// One node in a collection snapshot.
#[derive(Debug, Clone)]
pub struct CollectionNode {
    pub(crate) key: Key,
    pub(crate) variant: NodeVariant,
    pub(crate) parent_key: Option<Key>,
    pub(crate) index: usize,
    pub(crate) text_value: String,
    pub(crate) disabled: bool,
    pub(crate) href: Option<String>,
}

impl CollectionNode {
    /// Create a list item.
    pub fn item(key: impl Into<Key>, text_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            variant: NodeVariant::Item,
            parent_key: None,
            index: 0,
            text_value: text_value.into(),
            disabled: false,
            href: None,
        }
    }

    /// Create a grid row.
    pub fn row(key: impl Into<Key>, text_value: impl Into<String>) -> Self {
        Self {
            variant: NodeVariant::Row,
            ..Self::item(key, text_value)
        }
    }

    /// Create a grid cell spanning `col_span` columns.
    ///
    /// The column index is assigned when the cell joins a row.
    pub fn cell(key: impl Into<Key>, col_span: usize) -> Self {
        Self {
            variant: NodeVariant::Cell {
                col_index: 0,
                col_span: col_span.max(1),
            },
            ..Self::item(key, "")
        }
    }

    /// Mark the node disabled.
    pub fn with_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Attach a link target, making this a link item.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// The node's key.
    #[inline]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The node's shape.
    #[inline]
    pub fn variant(&self) -> NodeVariant {
        self.variant
    }

    /// Owning row for cells, `None` for top-level nodes.
    #[inline]
    pub fn parent_key(&self) -> Option<&Key> {
        self.parent_key.as_ref()
    }

    /// Position among siblings.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Text used for typeahead matching.
    #[inline]
    pub fn text_value(&self) -> &str {
        &self.text_value
    }

    /// Whether the item itself is flagged disabled.
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Link target, if this item is a link.
    #[inline]
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Whether the node is a row.
    pub fn is_row(&self) -> bool {
        self.variant == NodeVariant::Row
    }

    /// Whether the node is a cell.
    pub fn is_cell(&self) -> bool {
        matches!(self.variant, NodeVariant::Cell { .. })
    }
}
