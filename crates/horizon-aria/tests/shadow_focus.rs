//! Focus movement across shadow boundaries with the shadow-DOM
//! capability enabled.
//!
//! The capability flag is process-wide, so these tests live in their own
//! binary and every test turns the flag on.

use horizon_aria::dom::{ElementWalker, WhatToShow};
use horizon_aria::focus::{FocusManager, FocusOptions};
use horizon_aria_core::capability;
use horizon_aria_core::document::{Document, NodeId};

/// `[before, host{inner1, inner2}, after]`, all focusable.
fn shadow_fixture() -> (Document, [NodeId; 4], NodeId) {
    let mut doc = Document::new();
    let region = doc.create_child(doc.root(), "div");
    let before = doc.create_child(region, "input");
    let host = doc.create_child(region, "div");
    let shadow = doc.attach_shadow(host).unwrap();
    let inner1 = doc.create_child(shadow, "input");
    let inner2 = doc.create_child(shadow, "input");
    let after = doc.create_child(region, "input");
    (doc, [before, inner1, inner2, after], region)
}

#[test]
fn test_walker_descends_into_shadow_roots() {
    capability::set_shadow_dom_enabled(true);
    let (doc, nodes, region) = shadow_fixture();

    let mut walker = ElementWalker::new(region, WhatToShow::ELEMENT, None);
    let mut seen = Vec::new();
    while let Some(node) = walker.next_node(&doc) {
        seen.push(node);
    }
    // The host is never yielded; its shadow children appear in its place.
    assert_eq!(seen, nodes.to_vec());
}

#[test]
fn test_focus_next_crosses_shadow_boundaries() {
    capability::set_shadow_dom_enabled(true);
    let (mut doc, [before, inner1, inner2, after], region) = shadow_fixture();

    let manager = FocusManager::new(region);
    assert_eq!(
        manager.focus_first(&mut doc, &FocusOptions::tabbable()),
        Some(before)
    );
    for expected in [inner1, inner2, after] {
        assert_eq!(
            manager.focus_next(&mut doc, &FocusOptions::tabbable()),
            Some(expected)
        );
    }
    assert_eq!(doc.active_element(), Some(after));

    // And back out of the shadow tree.
    for expected in [inner2, inner1, before] {
        assert_eq!(
            manager.focus_previous(&mut doc, &FocusOptions::tabbable()),
            Some(expected)
        );
    }
}

#[test]
fn test_focus_last_reaches_light_sibling_after_host() {
    capability::set_shadow_dom_enabled(true);
    let (mut doc, [_, _, _, after], region) = shadow_fixture();

    let manager = FocusManager::new(region);
    assert_eq!(
        manager.focus_last(&mut doc, &FocusOptions::tabbable()),
        Some(after)
    );
}
