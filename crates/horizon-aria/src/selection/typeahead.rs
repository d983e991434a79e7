//! Typeahead: jump focus by typing an item's text prefix.
//!
//! Printable keystrokes accumulate in a search buffer and each one asks
//! the keyboard delegate for the first matching item at or after the
//! focused key, wrapping to the start when nothing follows. The buffer has
//! no internal timer; the host clears it on its own debounce schedule via
//! [`Typeahead::clear`].

use horizon_aria_core::document::Document;
use horizon_aria_core::logging::targets;

use crate::delegate::KeyboardDelegate;
use crate::event::{KeyCode, KeyEvent};
use crate::selection::manager::SelectionManager;

/// Search-buffer state for one collection.
#[derive(Debug, Default)]
pub struct Typeahead {
    buffer: String,
}

impl Typeahead {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulated search text.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Reset the search buffer. Hosts call this after their debounce
    /// interval elapses without further keystrokes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Feed a keydown into the search buffer.
    ///
    /// Only unmodified printable keys participate; Space joins an ongoing
    /// search but never starts one (an initial Space belongs to selection
    /// toggling). Moves the manager's focused key on a match.
    pub fn handle_key_down(
        &mut self,
        doc: &Document,
        delegate: &dyn KeyboardDelegate,
        manager: &mut SelectionManager,
        event: &mut KeyEvent,
    ) {
        if event.modifiers.control || event.modifiers.meta || event.modifiers.alt {
            return;
        }
        let ch = match event.code {
            KeyCode::Character(c) => c,
            KeyCode::Space if !self.buffer.is_empty() => ' ',
            _ => return,
        };
        self.buffer.push(ch);
        if ch == ' ' {
            // Keep Space from toggling selection mid-search.
            event.base.prevent_default();
            event.base.stop_propagation();
        }

        let from = manager.focused_key().cloned();
        let found = delegate
            .key_for_search(doc, &self.buffer, from.as_ref())
            .or_else(|| {
                // Wrap to the start, but only when the scan had a start
                // point to wrap from.
                from.is_some()
                    .then(|| delegate.key_for_search(doc, &self.buffer, None))
                    .flatten()
            });
        if let Some(key) = found {
            tracing::trace!(target: targets::SELECTION, search = %self.buffer, %key, "typeahead match");
            manager.set_focused_key(Some(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::key::Key;
    use crate::collection::list::ListCollection;
    use crate::collection::node::CollectionNode;
    use crate::delegate::{CaseInsensitiveCollator, Collator, ListKeyboardDelegate};
    use crate::event::Modifiers;

    fn names() -> ListCollection {
        [("a", "Alpha"), ("b", "Bravo"), ("c", "Charlie")]
            .into_iter()
            .map(|(k, text)| CollectionNode::item(k, text))
            .collect()
    }

    fn press(
        typeahead: &mut Typeahead,
        doc: &Document,
        delegate: &dyn KeyboardDelegate,
        manager: &mut SelectionManager,
        c: char,
    ) {
        let mut event = KeyEvent::new(KeyCode::Character(c), Modifiers::NONE);
        typeahead.handle_key_down(doc, delegate, manager, &mut event);
    }

    #[test]
    fn test_buffer_accumulates_to_match() {
        let doc = Document::new();
        let list = names();
        let collator = CaseInsensitiveCollator;
        let delegate = ListKeyboardDelegate::new(&list).with_collator(&collator);
        let mut manager = SelectionManager::new();
        let mut typeahead = Typeahead::new();

        press(&mut typeahead, &doc, &delegate, &mut manager, 'b');
        assert_eq!(manager.focused_key(), Some(&Key::from("b")));
        press(&mut typeahead, &doc, &delegate, &mut manager, 'r');
        assert_eq!(typeahead.buffer(), "br");
        assert_eq!(manager.focused_key(), Some(&Key::from("b")));
    }

    #[test]
    fn test_wraps_to_start_after_clear() {
        let doc = Document::new();
        let list = names();
        let collator = CaseInsensitiveCollator;
        let delegate = ListKeyboardDelegate::new(&list).with_collator(&collator);
        let mut manager = SelectionManager::new();
        let mut typeahead = Typeahead::new();

        manager.set_focused_key(Some(Key::from("c")));
        typeahead.clear();
        press(&mut typeahead, &doc, &delegate, &mut manager, 'a');
        // Nothing after Charlie matches; search wraps to Alpha.
        assert_eq!(manager.focused_key(), Some(&Key::from("a")));
    }

    #[test]
    fn test_unmatched_search_scans_once_without_focus() {
        use std::cell::Cell;

        struct CountingCollator(Cell<usize>);
        impl Collator for CountingCollator {
            fn matches_prefix(&self, text: &str, prefix: &str) -> bool {
                self.0.set(self.0.get() + 1);
                CaseInsensitiveCollator.matches_prefix(text, prefix)
            }
        }

        let doc = Document::new();
        let list = names();
        let collator = CountingCollator(Cell::new(0));
        let delegate = ListKeyboardDelegate::new(&list).with_collator(&collator);
        let mut manager = SelectionManager::new();
        let mut typeahead = Typeahead::new();

        press(&mut typeahead, &doc, &delegate, &mut manager, 'z');
        assert_eq!(manager.focused_key(), None);
        // No focused key means no wrap retry, so each item is compared once.
        assert_eq!(collator.0.get(), 3);
    }

    #[test]
    fn test_modified_keys_ignored() {
        let doc = Document::new();
        let list = names();
        let collator = CaseInsensitiveCollator;
        let delegate = ListKeyboardDelegate::new(&list).with_collator(&collator);
        let mut manager = SelectionManager::new();
        let mut typeahead = Typeahead::new();

        let mut event = KeyEvent::new(KeyCode::Character('b'), Modifiers::CTRL);
        typeahead.handle_key_down(&doc, &delegate, &mut manager, &mut event);
        assert_eq!(typeahead.buffer(), "");
        assert_eq!(manager.focused_key(), None);
    }

    #[test]
    fn test_space_only_continues_search() {
        let doc = Document::new();
        let list: ListCollection = [("n", "New York")]
            .into_iter()
            .map(|(k, t)| CollectionNode::item(k, t))
            .collect();
        let collator = CaseInsensitiveCollator;
        let delegate = ListKeyboardDelegate::new(&list).with_collator(&collator);
        let mut manager = SelectionManager::new();
        let mut typeahead = Typeahead::new();

        // Space with an empty buffer is not a search key.
        let mut space = KeyEvent::new(KeyCode::Space, Modifiers::NONE);
        typeahead.handle_key_down(&doc, &delegate, &mut manager, &mut space);
        assert_eq!(typeahead.buffer(), "");
        assert!(!space.base.default_prevented());

        for c in "new".chars() {
            press(&mut typeahead, &doc, &delegate, &mut manager, c);
        }
        let mut space = KeyEvent::new(KeyCode::Space, Modifiers::NONE);
        typeahead.handle_key_down(&doc, &delegate, &mut manager, &mut space);
        assert!(space.base.default_prevented());
        assert_eq!(typeahead.buffer(), "new ");
        press(&mut typeahead, &doc, &delegate, &mut manager, 'y');
        assert_eq!(manager.focused_key(), Some(&Key::from("n")));
    }
}
