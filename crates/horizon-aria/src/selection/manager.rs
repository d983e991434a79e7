//! Selection state for collections.
//!
//! [`SelectionManager`] owns which keys are selected, which key holds the
//! logical (roving) focus, and whether the collection as a whole holds DOM
//! focus. The controller mutates selection exclusively through it; the
//! component layer subscribes to its signals to update attributes.
//!
//! # Signals
//!
//! - `selection_changed`: emitted with (selected, deselected) keys
//! - `focused_key_changed`: emitted with (new, old) focused keys

use std::collections::HashSet;

use horizon_aria_core::logging::targets;
use horizon_aria_core::Signal;

use crate::collection::key::Key;
use crate::collection::traits::Collection;

/// How many items may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Selection is disabled.
    None,
    /// At most one key (default).
    #[default]
    Single,
    /// Any number of keys.
    Multiple,
}

/// What interaction selects an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionBehavior {
    /// Interactions toggle membership; navigation does not select.
    #[default]
    Toggle,
    /// Navigation replaces the selection with the focused item.
    Replace,
}

/// How disabled keys constrain interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisabledBehavior {
    /// Disabled keys are excluded from navigation and selection.
    #[default]
    All,
    /// Disabled keys are skipped for selection but remain navigable.
    Selection,
}

/// The selected set: everything, or an explicit set of keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every selectable key, regardless of collection contents.
    All,
    /// An explicit set.
    Keys(HashSet<Key>),
}

impl Selection {
    /// Whether the selection holds no keys.
    pub fn is_empty(&self) -> bool {
        match self {
            Selection::All => false,
            Selection::Keys(keys) => keys.is_empty(),
        }
    }

    /// Whether a key is in the selection.
    pub fn contains(&self, key: &Key) -> bool {
        match self {
            Selection::All => true,
            Selection::Keys(keys) => keys.contains(key),
        }
    }
}

/// Owns focused-key and selected-keys state for one collection.
pub struct SelectionManager {
    mode: SelectionMode,
    behavior: SelectionBehavior,
    selection: Selection,
    focused_key: Option<Key>,
    /// Whether the collection currently holds DOM focus.
    focused: bool,
    /// Range-selection anchor.
    anchor: Option<Key>,
    /// Other end of the current range extension.
    current: Option<Key>,
    disabled_keys: HashSet<Key>,
    disabled_behavior: DisabledBehavior,

    /// Emitted when selection changes. Args: (selected, deselected)
    pub selection_changed: Signal<(Vec<Key>, Vec<Key>)>,

    /// Emitted when the focused key changes. Args: (new, old)
    pub focused_key_changed: Signal<(Option<Key>, Option<Key>)>,
}

impl std::fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionManager")
            .field("mode", &self.mode)
            .field("behavior", &self.behavior)
            .field("focused_key", &self.focused_key)
            .finish()
    }
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionManager {
    /// Create a manager with single selection and toggle behavior.
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::default(),
            behavior: SelectionBehavior::default(),
            selection: Selection::Keys(HashSet::new()),
            focused_key: None,
            focused: false,
            anchor: None,
            current: None,
            disabled_keys: HashSet::new(),
            disabled_behavior: DisabledBehavior::default(),
            selection_changed: Signal::new(),
            focused_key_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.mode
    }

    /// Set the selection mode.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    /// The selection behavior.
    pub fn selection_behavior(&self) -> SelectionBehavior {
        self.behavior
    }

    /// Set the selection behavior.
    pub fn set_selection_behavior(&mut self, behavior: SelectionBehavior) {
        self.behavior = behavior;
    }

    /// The disabled-key handling mode.
    pub fn disabled_behavior(&self) -> DisabledBehavior {
        self.disabled_behavior
    }

    /// Set the disabled-key handling mode.
    pub fn set_disabled_behavior(&mut self, behavior: DisabledBehavior) {
        self.disabled_behavior = behavior;
    }

    /// Keys forcibly excluded from selection.
    pub fn disabled_keys(&self) -> &HashSet<Key> {
        &self.disabled_keys
    }

    /// Replace the disabled-key set.
    pub fn set_disabled_keys(&mut self, keys: HashSet<Key>) {
        self.disabled_keys = keys;
    }

    // =========================================================================
    // Focus state
    // =========================================================================

    /// Whether the collection holds DOM focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Record whether the collection holds DOM focus.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// The key holding logical focus, if any.
    pub fn focused_key(&self) -> Option<&Key> {
        self.focused_key.as_ref()
    }

    /// Move logical focus to a key (or clear it).
    pub fn set_focused_key(&mut self, key: Option<Key>) {
        if self.focused_key == key {
            return;
        }
        let old = self.focused_key.take();
        self.focused_key = key.clone();
        tracing::trace!(target: targets::SELECTION, ?key, "focused key changed");
        self.focused_key_changed.emit((key, old));
    }

    // =========================================================================
    // Selection queries
    // =========================================================================

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether a key is selected.
    pub fn is_selected(&self, key: &Key) -> bool {
        self.mode != SelectionMode::None && self.selection.contains(key)
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Whether a key may be selected at all.
    pub fn can_select(&self, collection: &dyn Collection, key: &Key) -> bool {
        if self.mode == SelectionMode::None || self.disabled_keys.contains(key) {
            return false;
        }
        collection.item(key).is_some_and(|node| !node.is_disabled())
    }

    /// First selected key in collection order.
    pub fn first_selected_key(&self, collection: &dyn Collection) -> Option<Key> {
        let mut key = collection.first_key();
        while let Some(k) = key {
            if self.is_selected(&k) {
                return Some(k);
            }
            key = collection.key_after(&k);
        }
        None
    }

    /// Last selected key in collection order.
    pub fn last_selected_key(&self, collection: &dyn Collection) -> Option<Key> {
        let mut key = collection.last_key();
        while let Some(k) = key {
            if self.is_selected(&k) {
                return Some(k);
            }
            key = collection.key_before(&k);
        }
        None
    }

    // =========================================================================
    // Selection mutation
    // =========================================================================

    /// Replace the selection with a single key, anchoring ranges there.
    pub fn replace_selection(&mut self, collection: &dyn Collection, key: &Key) {
        if !self.can_select(collection, key) {
            return;
        }
        let new: HashSet<Key> = [key.clone()].into();
        self.anchor = Some(key.clone());
        self.current = Some(key.clone());
        self.apply(collection, Selection::Keys(new));
    }

    /// Toggle one key's membership.
    ///
    /// In single mode this replaces the selection, or clears it when the
    /// key was already selected.
    pub fn toggle_selection(&mut self, collection: &dyn Collection, key: &Key) {
        if !self.can_select(collection, key) {
            return;
        }
        if self.mode == SelectionMode::Single {
            if self.is_selected(key) {
                self.clear_selection(collection);
            } else {
                self.replace_selection(collection, key);
            }
            return;
        }
        let mut keys = self.materialized(collection);
        if !keys.remove(key) {
            keys.insert(key.clone());
        }
        self.anchor = Some(key.clone());
        self.current = Some(key.clone());
        self.apply(collection, Selection::Keys(keys));
    }

    /// Extend the selection from the anchor to `key`, replacing the
    /// previous extension.
    ///
    /// Multiple-selection mode only; with no anchor this behaves as
    /// [`replace_selection`](SelectionManager::replace_selection).
    pub fn extend_selection(&mut self, collection: &dyn Collection, key: &Key) {
        if self.mode != SelectionMode::Multiple {
            self.replace_selection(collection, key);
            return;
        }
        if !self.can_select(collection, key) {
            return;
        }
        let Some(anchor) = self.anchor.clone() else {
            self.replace_selection(collection, key);
            return;
        };
        let mut keys = self.materialized(collection);
        if let Some(old_end) = self.current.clone() {
            for k in range_keys(collection, &anchor, &old_end) {
                keys.remove(&k);
            }
        }
        if self.can_select(collection, &anchor) {
            keys.insert(anchor.clone());
        }
        for k in range_keys(collection, &anchor, key) {
            if self.can_select(collection, &k) {
                keys.insert(k);
            }
        }
        self.current = Some(key.clone());
        self.apply(collection, Selection::Keys(keys));
    }

    /// Select everything.
    pub fn select_all(&mut self, collection: &dyn Collection) {
        if self.mode != SelectionMode::Multiple {
            return;
        }
        self.apply(collection, Selection::All);
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self, collection: &dyn Collection) {
        self.anchor = None;
        self.current = None;
        self.apply(collection, Selection::Keys(HashSet::new()));
    }

    /// The explicit key set, materializing the all-sentinel through the
    /// collection.
    fn materialized(&self, collection: &dyn Collection) -> HashSet<Key> {
        match &self.selection {
            Selection::Keys(keys) => keys.clone(),
            Selection::All => {
                let mut keys = HashSet::new();
                let mut key = collection.first_key();
                while let Some(k) = key {
                    key = collection.key_after(&k);
                    if self.can_select(collection, &k) {
                        keys.insert(k);
                    }
                }
                keys
            }
        }
    }

    fn apply(&mut self, collection: &dyn Collection, new: Selection) {
        if self.selection == new {
            return;
        }
        let before = self.materialized(collection);
        self.selection = new;
        let after = self.materialized(collection);

        let selected: Vec<Key> = after.difference(&before).cloned().collect();
        let deselected: Vec<Key> = before.difference(&after).cloned().collect();
        if selected.is_empty() && deselected.is_empty() {
            return;
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = selected.len(),
            deselected = deselected.len(),
            "selection changed"
        );
        self.selection_changed.emit((selected, deselected));
    }
}

/// Keys from `a` to `b` inclusive in collection order, in either order.
fn range_keys(collection: &dyn Collection, a: &Key, b: &Key) -> Vec<Key> {
    // Walk forward from `a`; if `b` never shows up, walk backward instead.
    for forward in [true, false] {
        let mut out = Vec::new();
        let mut key = Some(a.clone());
        while let Some(k) = key {
            let done = k == *b;
            key = if forward {
                collection.key_after(&k)
            } else {
                collection.key_before(&k)
            };
            out.push(k);
            if done {
                return out;
            }
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::list::ListCollection;
    use crate::collection::node::CollectionNode;
    use std::sync::{Arc, Mutex};

    fn list() -> ListCollection {
        ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|k| CollectionNode::item(k, k.to_uppercase()))
            .collect()
    }

    fn multi() -> SelectionManager {
        let mut manager = SelectionManager::new();
        manager.set_selection_mode(SelectionMode::Multiple);
        manager
    }

    #[test]
    fn test_replace_and_toggle() {
        let list = list();
        let mut manager = multi();

        manager.replace_selection(&list, &Key::from("b"));
        assert!(manager.is_selected(&Key::from("b")));

        manager.toggle_selection(&list, &Key::from("d"));
        assert!(manager.is_selected(&Key::from("b")));
        assert!(manager.is_selected(&Key::from("d")));

        manager.toggle_selection(&list, &Key::from("b"));
        assert!(!manager.is_selected(&Key::from("b")));
    }

    #[test]
    fn test_single_mode_toggle_replaces() {
        let list = list();
        let mut manager = SelectionManager::new();
        manager.set_selection_mode(SelectionMode::Single);

        manager.toggle_selection(&list, &Key::from("a"));
        manager.toggle_selection(&list, &Key::from("b"));
        assert!(!manager.is_selected(&Key::from("a")));
        assert!(manager.is_selected(&Key::from("b")));

        manager.toggle_selection(&list, &Key::from("b"));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_extend_selection_replaces_old_range() {
        let list = list();
        let mut manager = multi();

        manager.replace_selection(&list, &Key::from("b"));
        manager.set_focused_key(Some(Key::from("b")));

        manager.set_focused_key(Some(Key::from("d")));
        manager.extend_selection(&list, &Key::from("d"));
        for k in ["b", "c", "d"] {
            assert!(manager.is_selected(&Key::from(k)), "{k} selected");
        }

        // Shrinking the extension deselects the tail.
        manager.extend_selection(&list, &Key::from("c"));
        assert!(manager.is_selected(&Key::from("c")));
        assert!(!manager.is_selected(&Key::from("d")));

        // Extending backward across the anchor flips the range.
        manager.set_focused_key(Some(Key::from("a")));
        manager.extend_selection(&list, &Key::from("a"));
        assert!(manager.is_selected(&Key::from("a")));
        assert!(manager.is_selected(&Key::from("b")));
    }

    #[test]
    fn test_select_all_and_clear() {
        let list = list();
        let mut manager = multi();

        manager.select_all(&list);
        assert_eq!(manager.selection(), &Selection::All);
        assert!(manager.is_selected(&Key::from("e")));

        manager.clear_selection(&list);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_disabled_keys_not_selectable() {
        let list = list();
        let mut manager = multi();
        manager.set_disabled_keys([Key::from("c")].into());

        manager.replace_selection(&list, &Key::from("c"));
        assert!(manager.is_empty());

        // Ranges skip disabled members.
        manager.replace_selection(&list, &Key::from("b"));
        manager.set_focused_key(Some(Key::from("d")));
        manager.extend_selection(&list, &Key::from("d"));
        assert!(manager.is_selected(&Key::from("b")));
        assert!(!manager.is_selected(&Key::from("c")));
        assert!(manager.is_selected(&Key::from("d")));
    }

    #[test]
    fn test_first_and_last_selected() {
        let list = list();
        let mut manager = multi();
        manager.toggle_selection(&list, &Key::from("d"));
        manager.toggle_selection(&list, &Key::from("b"));

        assert_eq!(manager.first_selected_key(&list), Some(Key::from("b")));
        assert_eq!(manager.last_selected_key(&list), Some(Key::from("d")));
    }

    #[test]
    fn test_selection_changed_signal() {
        let list = list();
        let mut manager = multi();
        let log: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        manager
            .selection_changed
            .connect(move |(selected, deselected)| {
                l.lock().unwrap().push((selected.len(), deselected.len()));
            });

        manager.replace_selection(&list, &Key::from("a"));
        manager.replace_selection(&list, &Key::from("b"));
        assert_eq!(*log.lock().unwrap(), vec![(1, 0), (1, 1)]);
    }
}
