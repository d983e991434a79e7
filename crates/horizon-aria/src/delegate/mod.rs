//! Keyboard navigation delegates.
//!
//! A delegate is a pure query layer: given the currently focused key and a
//! direction, it answers which key focus should move to, using collection
//! order and on-screen geometry. Delegates never mutate anything; the
//! selectable-collection controller applies their answers.

pub mod grid;
pub mod list;

use horizon_aria_core::document::Document;
use unicode_segmentation::UnicodeSegmentation;

use crate::collection::key::Key;

pub use grid::{GridKeyboardDelegate, GridLayoutSource};
pub use list::{ListKeyboardDelegate, ListLayout};

/// Reading direction, for mirroring horizontal navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Main axis of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Whether arrow keys move between grid rows or individual cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusMode {
    #[default]
    Row,
    Cell,
}

/// Maps "current key + direction" to a candidate key.
///
/// `None` always means "navigation has no effect"; callers leave prior
/// state untouched.
pub trait KeyboardDelegate {
    /// Key below the given one.
    fn key_below(&self, doc: &Document, key: &Key) -> Option<Key>;

    /// Key above the given one.
    fn key_above(&self, doc: &Document, key: &Key) -> Option<Key>;

    /// Key visually left of the given one.
    fn key_left_of(&self, doc: &Document, key: &Key) -> Option<Key>;

    /// Key visually right of the given one.
    fn key_right_of(&self, doc: &Document, key: &Key) -> Option<Key>;

    /// First navigable key.
    fn first_key(&self, doc: &Document) -> Option<Key>;

    /// Last navigable key.
    fn last_key(&self, doc: &Document) -> Option<Key>;

    /// Key one page above the given one.
    fn key_page_above(&self, doc: &Document, key: &Key) -> Option<Key>;

    /// Key one page below the given one.
    fn key_page_below(&self, doc: &Document, key: &Key) -> Option<Key>;

    /// First key at or after `from` whose text matches the typed prefix.
    ///
    /// Returns `None` when no collator is available or nothing matches.
    fn key_for_search(&self, doc: &Document, search: &str, from: Option<&Key>) -> Option<Key>;
}

/// Locale-aware prefix comparison for typeahead.
pub trait Collator {
    /// Whether `text` starts with `prefix`, compared insensitively.
    fn matches_prefix(&self, text: &str, prefix: &str) -> bool;
}

/// Grapheme-aware, case-insensitive prefix matching.
///
/// Truncates the candidate text to the prefix's grapheme length before
/// comparing, so multi-scalar clusters never match halfway.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveCollator;

impl Collator for CaseInsensitiveCollator {
    fn matches_prefix(&self, text: &str, prefix: &str) -> bool {
        if prefix.is_empty() {
            return false;
        }
        let len = prefix.graphemes(true).count();
        let head: String = text.graphemes(true).take(len).collect();
        head.to_lowercase() == prefix.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collator_prefix() {
        let c = CaseInsensitiveCollator;
        assert!(c.matches_prefix("Bravo", "br"));
        assert!(c.matches_prefix("Bravo", "BRAVO"));
        assert!(!c.matches_prefix("Bravo", "ra"));
        assert!(!c.matches_prefix("Br", "bravo"));
        assert!(!c.matches_prefix("Bravo", ""));
    }

    #[test]
    fn test_collator_graphemes() {
        let c = CaseInsensitiveCollator;
        // The family emoji is one grapheme of several scalars.
        assert!(c.matches_prefix("👨‍👩‍👧 house", "👨‍👩‍👧"));
        assert!(!c.matches_prefix("👨‍👩‍👧 house", "👨"));
    }
}
