//! ARIA and roving-tabindex attribute maps.
//!
//! The engine never renders; it produces plain attribute maps the
//! component layer spreads onto real elements. The container follows the
//! roving tabindex pattern: it is a tab stop (`tabindex="0"`) only while
//! nothing inside owns focus, then hands the stop to the focused item.

use std::collections::BTreeMap;

use horizon_aria_core::document::{Document, NodeId};

use crate::collection::node::CollectionNode;
use crate::selection::{SelectionManager, SelectionMode};

/// Attribute name/value pairs, ordered for deterministic application.
pub type AttributeMap = BTreeMap<String, String>;

/// Attributes for the collection container element.
///
/// With `virtual_focus`, assistive technology tracks focus itself and the
/// container must not be a native tab stop at all.
pub fn collection_attributes(
    manager: &SelectionManager,
    role: &str,
    virtual_focus: bool,
) -> AttributeMap {
    let mut attrs = AttributeMap::new();
    attrs.insert("role".into(), role.into());
    attrs.insert("data-collection".into(), "true".into());
    if !virtual_focus {
        let tabindex = if manager.focused_key().is_none() { "0" } else { "-1" };
        attrs.insert("tabindex".into(), tabindex.into());
    }
    if manager.selection_mode() == SelectionMode::Multiple {
        attrs.insert("aria-multiselectable".into(), "true".into());
    }
    attrs
}

/// Attributes for one item element.
pub fn item_attributes(
    manager: &SelectionManager,
    node: &CollectionNode,
    role: &str,
    virtual_focus: bool,
) -> AttributeMap {
    let mut attrs = AttributeMap::new();
    attrs.insert("role".into(), role.into());
    attrs.insert("data-key".into(), node.key().to_string());
    if !virtual_focus {
        let focused = manager.focused_key() == Some(node.key());
        attrs.insert("tabindex".into(), if focused { "0" } else { "-1" }.into());
    }
    if manager.selection_mode() != SelectionMode::None {
        let selected = manager.is_selected(node.key());
        attrs.insert("aria-selected".into(), selected.to_string());
    }
    if node.is_disabled() || manager.disabled_keys().contains(node.key()) {
        attrs.insert("aria-disabled".into(), "true".into());
    }
    attrs
}

/// Write an attribute map onto a document element.
pub fn apply_attributes(doc: &mut Document, node: NodeId, attrs: &AttributeMap) {
    for (name, value) in attrs {
        doc.set_attribute(node, name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::key::Key;
    use crate::collection::list::ListCollection;
    use crate::collection::traits::Collection;

    fn list() -> ListCollection {
        ["a", "b"]
            .into_iter()
            .map(|k| CollectionNode::item(k, k.to_uppercase()))
            .collect()
    }

    #[test]
    fn test_roving_tabindex() {
        let list = list();
        let mut manager = SelectionManager::new();

        let attrs = collection_attributes(&manager, "listbox", false);
        assert_eq!(attrs.get("tabindex").map(String::as_str), Some("0"));

        manager.set_focused_key(Some(Key::from("a")));
        let attrs = collection_attributes(&manager, "listbox", false);
        assert_eq!(attrs.get("tabindex").map(String::as_str), Some("-1"));

        let node_a = list.item(&Key::from("a")).unwrap();
        let node_b = list.item(&Key::from("b")).unwrap();
        let a = item_attributes(&manager, node_a, "option", false);
        let b = item_attributes(&manager, node_b, "option", false);
        assert_eq!(a.get("tabindex").map(String::as_str), Some("0"));
        assert_eq!(b.get("tabindex").map(String::as_str), Some("-1"));
    }

    #[test]
    fn test_virtual_focus_removes_tab_stops() {
        let manager = SelectionManager::new();
        let attrs = collection_attributes(&manager, "listbox", true);
        assert!(!attrs.contains_key("tabindex"));
    }

    #[test]
    fn test_selection_attributes() {
        let list = list();
        let mut manager = SelectionManager::new();
        manager.set_selection_mode(SelectionMode::Multiple);
        manager.replace_selection(&list, &Key::from("b"));

        let attrs = collection_attributes(&manager, "listbox", false);
        assert_eq!(
            attrs.get("aria-multiselectable").map(String::as_str),
            Some("true")
        );
        let node_b = list.item(&Key::from("b")).unwrap();
        let b = item_attributes(&manager, node_b, "option", false);
        assert_eq!(b.get("aria-selected").map(String::as_str), Some("true"));
        assert_eq!(b.get("data-key").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_apply_writes_through() {
        let manager = SelectionManager::new();
        let mut doc = Document::new();
        let ul = doc.create_child(doc.root(), "ul");

        apply_attributes(&mut doc, ul, &collection_attributes(&manager, "listbox", false));
        assert_eq!(doc.get(ul).unwrap().attribute("role"), Some("listbox"));
    }
}
