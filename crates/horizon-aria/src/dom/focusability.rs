//! Focusability and tabbability predicates.
//!
//! An element is *focusable* when it matches the interactive-element
//! selector (enabled form controls, links with an `href`, `summary`, media
//! with controls, editable content, or anything carrying `tabindex`), is
//! rendered (not `display: none`, not `visibility: hidden`, no `hidden`
//! attribute on it or an ancestor, not inside a closed `<details>` other
//! than its summary), and is not inside an inert subtree.
//!
//! *Tabbable* additionally requires the tab index not be negative: a
//! `tabindex="-1"` element can be focused programmatically but is skipped
//! by Tab navigation.

use horizon_aria_core::document::{Document, Element, NodeId, NodeKind, Visibility};

use crate::dom::walker::{filter_fn, FilterResult, SharedFilter};

/// Whether the element matches the focusable-element selector, ignoring
/// visibility and inertness.
pub fn matches_focusable_selector(element: &Element) -> bool {
    if element.kind() != NodeKind::Element {
        return false;
    }
    let by_tag = match element.tag() {
        "input" | "select" | "textarea" | "button" => !element.is_disabled(),
        "a" | "area" => element.has_attribute("href"),
        "summary" | "iframe" | "object" | "embed" => true,
        "audio" | "video" => element.has_attribute("controls"),
        _ => false,
    };
    by_tag
        || element.is_content_editable()
        || (element.has_attribute("tabindex") && !element.is_disabled())
}

fn is_closed_details(element: &Element) -> bool {
    element.tag() == "details" && !element.has_attribute("open")
}

/// Whether the element is rendered: its own computed visibility is
/// `visible` and no ancestor hides it via `display: none`, the `hidden`
/// attribute, or a closed `<details>` (the summary stays rendered).
pub fn is_visible(doc: &Document, node: NodeId) -> bool {
    let Some(element) = doc.get(node) else {
        return false;
    };
    if element.kind() == NodeKind::Element && element.style().visibility != Visibility::Visible {
        return false;
    }
    let mut child: Option<NodeId> = None;
    let mut current = Some(node);
    while let Some(id) = current {
        let Some(e) = doc.get(id) else {
            return false;
        };
        if e.kind() == NodeKind::Element {
            if e.style().display_none || e.has_hidden_attribute() {
                return false;
            }
            if is_closed_details(e) {
                let child_is_summary = child
                    .and_then(|c| doc.get(c))
                    .is_some_and(|c| c.tag() == "summary");
                if !child_is_summary {
                    return false;
                }
            }
        }
        child = Some(id);
        current = doc.composed_parent(id);
    }
    true
}

fn in_inert_tree(doc: &Document, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if doc.get(id).is_some_and(|e| e.is_inert()) {
            return true;
        }
        current = doc.composed_parent(id);
    }
    false
}

/// Whether the element can receive focus at all.
pub fn is_focusable(doc: &Document, node: NodeId) -> bool {
    doc.get(node).is_some_and(matches_focusable_selector)
        && is_visible(doc, node)
        && !in_inert_tree(doc, node)
}

/// Whether the element participates in Tab navigation.
pub fn is_tabbable(doc: &Document, node: NodeId) -> bool {
    is_focusable(doc, node) && doc.get(node).and_then(|e| e.tabindex()).is_none_or(|t| t >= 0)
}

/// Judge one walker candidate during a top-down focus traversal.
///
/// Subtree-hiding conditions (`display: none`, the `hidden` attribute,
/// `inert`, non-summary content of a closed `<details>`) reject so the
/// walker prunes descendants; per-element conditions only skip, since a
/// hidden or unfocusable wrapper can still contain focusable children.
pub fn focus_filter_result(doc: &Document, node: NodeId, tabbable: bool) -> FilterResult {
    let Some(element) = doc.get(node) else {
        return FilterResult::Reject;
    };
    if element.kind() != NodeKind::Element {
        return FilterResult::Skip;
    }
    if element.style().display_none || element.has_hidden_attribute() || element.is_inert() {
        return FilterResult::Reject;
    }
    let inside_closed_details = doc
        .composed_parent(node)
        .and_then(|p| doc.get(p))
        .is_some_and(is_closed_details);
    if inside_closed_details && element.tag() != "summary" {
        return FilterResult::Reject;
    }
    if element.style().visibility != Visibility::Visible
        || !matches_focusable_selector(element)
    {
        return FilterResult::Skip;
    }
    if tabbable && element.tabindex().is_some_and(|t| t < 0) {
        return FilterResult::Skip;
    }
    FilterResult::Accept
}

/// A shared walker filter selecting focusable (or tabbable) elements.
pub fn focusable_filter(tabbable: bool) -> SharedFilter {
    filter_fn(move |doc: &Document, node: NodeId| focus_filter_result(doc, node, tabbable))
}
