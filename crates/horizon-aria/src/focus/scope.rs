//! Focus containment and restoration scopes.
//!
//! A scope is a mounted region of the document that can contain Tab
//! navigation within itself, seize focus when it appears, and give focus
//! back to the previously focused element when it goes away. Scopes nest;
//! the registry tracks which mounted scope currently owns focus (the
//! "active" scope) so sibling contained scopes cannot steal containment
//! from one another.
//!
//! The registry is owned per document rather than process-wide, so two
//! documents never fight over one active pointer. The host wires its
//! input pipeline to [`FocusScopes::handle_key_down`],
//! [`handle_focus_in`](FocusScopes::handle_focus_in) and
//! [`handle_focus_out`](FocusScopes::handle_focus_out).
//!
//! # Radio groups
//!
//! Containment treats a named radio group as a single tab stop: an
//! unchecked radio whose group has a checked member elsewhere is skipped
//! in both directions, so Tab lands on the checked member only. A group
//! with no checked member keeps its radios as ordinary tab stops.

use slotmap::{new_key_type, SlotMap};

use horizon_aria_core::document::{Document, NodeId};
use horizon_aria_core::logging::targets;

use crate::dom::focusability::{focus_filter_result, is_focusable};
use crate::dom::walker::{filter_fn, ElementWalker, FilterResult, SharedFilter, WhatToShow};
use crate::event::{ChainedEvent, EventBase, FocusEvent, HandlerChain, KeyCode, KeyEvent};
use crate::focus::manager::{FocusManager, FocusOptions};

new_key_type! {
    /// Identifier for a mounted focus scope.
    pub struct ScopeId;
}

/// Behavior switches for a focus scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeOptions {
    /// Keep Tab/Shift+Tab cycling inside the scope while mounted.
    pub contain: bool,
    /// Restore focus to the previously focused element on unmount.
    pub restore_focus: bool,
    /// Focus the first tabbable descendant on mount, unless a descendant
    /// already holds focus.
    pub auto_focus: bool,
}

impl ScopeOptions {
    /// Enable containment.
    pub fn with_contain(mut self) -> Self {
        self.contain = true;
        self
    }

    /// Enable restoration on unmount.
    pub fn with_restore_focus(mut self) -> Self {
        self.restore_focus = true;
        self
    }

    /// Enable auto focus on mount.
    pub fn with_auto_focus(mut self) -> Self {
        self.auto_focus = true;
        self
    }
}

/// Cancelable notification dispatched just before a scope restores focus
/// on unmount. Calling `prevent_default` keeps focus where it is.
#[derive(Debug, Clone)]
pub struct RestoreFocusEvent {
    /// Base event flags.
    pub base: EventBase,
    /// Root element of the unmounting scope.
    pub scope_root: NodeId,
    /// The element focus is about to return to.
    pub target: NodeId,
}

impl ChainedEvent for RestoreFocusEvent {
    fn base(&self) -> &EventBase {
        &self.base
    }
}

#[derive(Debug)]
struct ScopeState {
    root: NodeId,
    options: ScopeOptions,
    /// Element focused before mount, when `restore_focus` is set.
    restore_target: Option<NodeId>,
    /// Most recently focused descendant, for snap-back.
    last_focused: Option<NodeId>,
    /// Set while this scope tears down; suppresses restoration in
    /// descendant scopes unmounting in the same tick.
    unmounting: bool,
    parent: Option<ScopeId>,
}

/// Registry of mounted focus scopes for one document.
pub struct FocusScopes {
    scopes: SlotMap<ScopeId, ScopeState>,
    /// Mount order, outermost first.
    stack: Vec<ScopeId>,
    /// The scope that owns the currently focused element.
    active: Option<ScopeId>,
    restore_handlers: HandlerChain<RestoreFocusEvent>,
}

impl std::fmt::Debug for FocusScopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusScopes")
            .field("mounted", &self.stack.len())
            .field("active", &self.active)
            .finish()
    }
}

impl Default for FocusScopes {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusScopes {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            scopes: SlotMap::with_key(),
            stack: Vec::new(),
            active: None,
            restore_handlers: HandlerChain::new(),
        }
    }

    /// The scope that currently owns focus, if any.
    pub fn active_scope(&self) -> Option<ScopeId> {
        self.active
    }

    /// The root element of a mounted scope.
    pub fn scope_root(&self, id: ScopeId) -> Option<NodeId> {
        self.scopes.get(id).map(|s| s.root)
    }

    /// Register a handler consulted before focus restoration; handlers may
    /// cancel it via `prevent_default`.
    pub fn on_restore_focus<F>(&mut self, handler: F)
    where
        F: FnMut(&mut RestoreFocusEvent) + 'static,
    {
        self.restore_handlers.push(handler);
    }

    fn innermost_containing(&self, doc: &Document, node: NodeId) -> Option<ScopeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                self.scopes
                    .get(id)
                    .is_some_and(|s| doc.contains(s.root, node))
            })
    }

    fn innermost_containing_with_contain(&self, doc: &Document, node: NodeId) -> Option<ScopeId> {
        self.stack.iter().rev().copied().find(|&id| {
            self.scopes
                .get(id)
                .is_some_and(|s| s.options.contain && doc.contains(s.root, node))
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Mount a scope rooted at `root`.
    pub fn mount(&mut self, doc: &mut Document, root: NodeId, options: ScopeOptions) -> ScopeId {
        let restore_target = if options.restore_focus {
            doc.active_element()
        } else {
            None
        };
        let parent = self.innermost_containing(doc, root);
        let id = self.scopes.insert(ScopeState {
            root,
            options,
            restore_target,
            last_focused: None,
            unmounting: false,
            parent,
        });
        self.stack.push(id);
        tracing::debug!(target: targets::SCOPE, ?root, contain = options.contain, "scope mounted");

        let already_inside = doc
            .active_element()
            .is_some_and(|active| doc.contains(root, active));
        if already_inside {
            // Adopt the existing focus without moving it.
            self.scopes[id].last_focused = doc.active_element();
            self.active = Some(id);
        } else if options.auto_focus {
            if let Some(first) = FocusManager::new(root).focus_first(doc, &FocusOptions::tabbable())
            {
                self.scopes[id].last_focused = Some(first);
                self.active = Some(id);
            }
        }
        id
    }

    /// Mark a scope as tearing down without removing it yet.
    ///
    /// Hosts that unmount a subtree call this on the outermost scope
    /// first, then [`unmount`](FocusScopes::unmount) scopes bottom-up;
    /// descendants then leave restoration to the ancestor.
    pub fn begin_unmount(&mut self, id: ScopeId) {
        if let Some(state) = self.scopes.get_mut(id) {
            state.unmounting = true;
        }
    }

    /// Unmount a scope, restoring focus when configured.
    pub fn unmount(&mut self, doc: &mut Document, id: ScopeId) {
        let Some(state) = self.scopes.get_mut(id) else {
            return;
        };
        state.unmounting = true;
        let root = state.root;
        let options = state.options;
        let restore_target = state.restore_target;

        // A scope unmounting inside an ancestor's teardown leaves
        // restoration to the ancestor.
        let mut ancestor_unmounting = false;
        let mut cursor = self.scopes.get(id).and_then(|s| s.parent);
        while let Some(pid) = cursor {
            let Some(parent) = self.scopes.get(pid) else {
                break;
            };
            if parent.unmounting {
                ancestor_unmounting = true;
                break;
            }
            cursor = parent.parent;
        }

        if options.restore_focus && !ancestor_unmounting {
            if let Some(target) = restore_target {
                let focus_inside = doc
                    .active_element()
                    .is_none_or(|active| doc.contains(root, active));
                if focus_inside && doc.is_attached(target) {
                    let mut event = RestoreFocusEvent {
                        base: EventBase::new(),
                        scope_root: root,
                        target,
                    };
                    self.restore_handlers.dispatch(&mut event);
                    if !event.base.default_prevented() {
                        tracing::debug!(target: targets::SCOPE, ?target, "restoring focus");
                        doc.focus(target);
                    }
                }
            }
        }

        self.scopes.remove(id);
        if self.stack.last() == Some(&id) {
            self.stack.pop();
        } else {
            self.stack.retain(|&s| s != id);
        }
        if self.active == Some(id) {
            self.active = doc
                .active_element()
                .and_then(|active| self.innermost_containing(doc, active));
        }
    }

    // =========================================================================
    // Event handling
    // =========================================================================

    /// Intercept Tab/Shift+Tab to cycle focus within the containing scope.
    ///
    /// Only acts when the event target sits inside a mounted scope with
    /// containment enabled; modifier keys other than Shift disable
    /// interception for that keypress.
    pub fn handle_key_down(&mut self, doc: &mut Document, event: &mut KeyEvent) {
        if event.code != KeyCode::Tab {
            return;
        }
        let modifiers = event.modifiers;
        if modifiers.alt || modifiers.control || modifiers.meta {
            return;
        }
        let Some(target) = event.target.or_else(|| doc.active_element()) else {
            return;
        };
        let Some(scope) = self.innermost_containing_with_contain(doc, target) else {
            return;
        };
        let root = self.scopes[scope].root;

        event.base.prevent_default();
        let filter = radio_aware_tab_filter();
        let mut walker = ElementWalker::new(root, WhatToShow::ELEMENT, Some(filter.clone()));
        let positioned = walker.set_current(doc, target).is_ok();

        let next = if modifiers.shift {
            positioned
                .then(|| walker.previous_node(doc))
                .flatten()
                .or_else(|| {
                    // Wrap to the end of the scope.
                    ElementWalker::new(root, WhatToShow::ELEMENT, Some(filter.clone()))
                        .last_child(doc)
                })
        } else {
            positioned
                .then(|| walker.next_node(doc))
                .flatten()
                .or_else(|| {
                    ElementWalker::new(root, WhatToShow::ELEMENT, Some(filter)).next_node(doc)
                })
        };

        if let Some(next) = next {
            doc.focus(next);
            self.note_focus(doc, next);
            self.active = Some(scope);
        }
    }

    /// Track focus arriving at an element, activating its scope.
    ///
    /// If the active scope has containment and the new target lies outside
    /// it (for example a sibling contained scope was focused
    /// programmatically), focus snaps back instead of transferring.
    pub fn handle_focus_in(&mut self, doc: &mut Document, event: &FocusEvent) {
        let target = event.target;
        if let Some(active) = self.active {
            if let Some(state) = self.scopes.get(active) {
                if state.options.contain && !doc.contains(state.root, target) {
                    self.snap_back(doc, active);
                    return;
                }
            }
        }
        if let Some(scope) = self.innermost_containing(doc, target) {
            self.active = Some(scope);
        }
        self.note_focus(doc, target);
    }

    /// Track focus leaving an element.
    ///
    /// When the active scope has containment and focus is headed outside
    /// it (or nowhere), focus snaps back to the last focused descendant.
    pub fn handle_focus_out(&mut self, doc: &mut Document, event: &FocusEvent) {
        let Some(active) = self.active else {
            return;
        };
        let Some(state) = self.scopes.get(active) else {
            return;
        };
        if !state.options.contain || !doc.contains(state.root, event.target) {
            return;
        }
        let escaped = event
            .related_target
            .is_none_or(|next| !doc.contains(state.root, next));
        if escaped {
            self.snap_back(doc, active);
        }
    }

    /// Record `node` as the last focused descendant of every scope that
    /// contains it.
    fn note_focus(&mut self, doc: &Document, node: NodeId) {
        for &id in &self.stack {
            if let Some(state) = self.scopes.get_mut(id) {
                if doc.contains(state.root, node) {
                    state.last_focused = Some(node);
                }
            }
        }
    }

    fn snap_back(&mut self, doc: &mut Document, scope: ScopeId) {
        let Some(state) = self.scopes.get(scope) else {
            return;
        };
        let root = state.root;
        let last = state
            .last_focused
            .filter(|&n| doc.is_attached(n) && is_focusable(doc, n));
        tracing::debug!(target: targets::SCOPE, ?root, "focus escaped containment, snapping back");
        match last {
            Some(last) => {
                doc.focus(last);
            }
            None => {
                FocusManager::new(root).focus_first(doc, &FocusOptions::tabbable());
            }
        }
    }
}

/// Tabbable filter treating checked radio groups as single tab stops.
fn radio_aware_tab_filter() -> SharedFilter {
    filter_fn(|doc: &Document, node: NodeId| {
        let result = focus_filter_result(doc, node, true);
        if result != FilterResult::Accept {
            return result;
        }
        let Some(element) = doc.get(node) else {
            return FilterResult::Reject;
        };
        if let Some(group) = element.radio_group() {
            if !element.is_checked() && doc.checked_radio_in_group(group).is_some() {
                return FilterResult::Skip;
            }
        }
        FilterResult::Accept
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;

    fn tab() -> KeyEvent {
        KeyEvent::new(KeyCode::Tab, Modifiers::NONE)
    }

    fn shift_tab() -> KeyEvent {
        KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT)
    }

    fn press(scopes: &mut FocusScopes, doc: &mut Document, mut event: KeyEvent) -> bool {
        scopes.handle_key_down(doc, &mut event);
        event.base.default_prevented()
    }

    #[test]
    fn test_containment_cycles_forward_and_backward() {
        let mut doc = Document::new();
        let region = doc.create_child(doc.root(), "div");
        let a = doc.create_child(region, "input");
        let b = doc.create_child(region, "input");
        let c = doc.create_child(region, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(a);
        scopes.mount(&mut doc, region, ScopeOptions::default().with_contain());

        for expected in [b, c, a, b] {
            assert!(press(&mut scopes, &mut doc, tab()));
            assert_eq!(doc.active_element(), Some(expected));
        }
        // Back to a, then backward wraps to c.
        doc.focus(a);
        for expected in [c, b, a, c] {
            assert!(press(&mut scopes, &mut doc, shift_tab()));
            assert_eq!(doc.active_element(), Some(expected));
        }
    }

    #[test]
    fn test_alt_tab_not_intercepted() {
        let mut doc = Document::new();
        let region = doc.create_child(doc.root(), "div");
        let a = doc.create_child(region, "input");
        let _b = doc.create_child(region, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(a);
        scopes.mount(&mut doc, region, ScopeOptions::default().with_contain());

        let mut event = KeyEvent::new(KeyCode::Tab, Modifiers::ALT);
        scopes.handle_key_down(&mut doc, &mut event);
        assert!(!event.base.default_prevented());
        assert_eq!(doc.active_element(), Some(a));
    }

    #[test]
    fn test_auto_focus_and_restore_on_unmount() {
        let mut doc = Document::new();
        let outside = doc.create_child(doc.root(), "button");
        let dialog = doc.create_child(doc.root(), "div");
        let first = doc.create_child(dialog, "input");
        let _second = doc.create_child(dialog, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(outside);
        let id = scopes.mount(
            &mut doc,
            dialog,
            ScopeOptions::default()
                .with_contain()
                .with_restore_focus()
                .with_auto_focus(),
        );
        assert_eq!(doc.active_element(), Some(first));

        scopes.unmount(&mut doc, id);
        assert_eq!(doc.active_element(), Some(outside));
    }

    #[test]
    fn test_auto_focus_skipped_when_descendant_already_focused() {
        let mut doc = Document::new();
        let dialog = doc.create_child(doc.root(), "div");
        let first = doc.create_child(dialog, "input");
        let second = doc.create_child(dialog, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(second);
        scopes.mount(&mut doc, dialog, ScopeOptions::default().with_auto_focus());
        assert_eq!(doc.active_element(), Some(second));
        let _ = first;
    }

    #[test]
    fn test_restore_skipped_when_target_detached() {
        let mut doc = Document::new();
        let outside = doc.create_child(doc.root(), "button");
        let dialog = doc.create_child(doc.root(), "div");
        let inner = doc.create_child(dialog, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(outside);
        let id = scopes.mount(
            &mut doc,
            dialog,
            ScopeOptions::default().with_restore_focus().with_auto_focus(),
        );
        assert_eq!(doc.active_element(), Some(inner));

        doc.remove_node(outside);
        scopes.unmount(&mut doc, id);
        // The restore target is gone; focus stays where it was.
        assert_eq!(doc.active_element(), Some(inner));
    }

    #[test]
    fn test_restore_cancelable() {
        let mut doc = Document::new();
        let outside = doc.create_child(doc.root(), "button");
        let dialog = doc.create_child(doc.root(), "div");
        let inner = doc.create_child(dialog, "input");

        let mut scopes = FocusScopes::new();
        scopes.on_restore_focus(|event| event.base.prevent_default());
        doc.focus(outside);
        let id = scopes.mount(
            &mut doc,
            dialog,
            ScopeOptions::default().with_restore_focus().with_auto_focus(),
        );
        assert_eq!(doc.active_element(), Some(inner));

        scopes.unmount(&mut doc, id);
        assert_eq!(doc.active_element(), Some(inner));
    }

    #[test]
    fn test_nested_unmount_restores_once() {
        let mut doc = Document::new();
        let outside = doc.create_child(doc.root(), "button");
        let outer = doc.create_child(doc.root(), "div");
        let outer_input = doc.create_child(outer, "input");
        let inner = doc.create_child(outer, "div");
        let _inner_input = doc.create_child(inner, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(outside);
        let outer_id = scopes.mount(
            &mut doc,
            outer,
            ScopeOptions::default().with_restore_focus().with_auto_focus(),
        );
        assert_eq!(doc.active_element(), Some(outer_input));
        let inner_id = scopes.mount(
            &mut doc,
            inner,
            ScopeOptions::default().with_restore_focus().with_auto_focus(),
        );

        // Outer begins teardown first; the nested scope must not restore
        // to its own (stale, mid-teardown) target.
        scopes.begin_unmount(outer_id);
        scopes.unmount(&mut doc, inner_id);
        assert_ne!(doc.active_element(), Some(outer_input));
        scopes.unmount(&mut doc, outer_id);
        assert_eq!(doc.active_element(), Some(outside));
    }

    #[test]
    fn test_radio_group_single_tab_stop() {
        let mut doc = Document::new();
        let region = doc.create_child(doc.root(), "div");
        let button1 = doc.create_child(region, "button");
        let mut radios = Vec::new();
        for _ in 0..3 {
            let r = doc.create_child(region, "input");
            doc.set_attribute(r, "type", "radio");
            doc.set_attribute(r, "name", "choice");
            radios.push(r);
        }
        let button2 = doc.create_child(region, "button");
        doc.check_radio(radios[0]);

        let mut scopes = FocusScopes::new();
        doc.focus(button1);
        scopes.mount(&mut doc, region, ScopeOptions::default().with_contain());

        // Forward: checked radio, then past the group.
        assert!(press(&mut scopes, &mut doc, tab()));
        assert_eq!(doc.active_element(), Some(radios[0]));
        assert!(press(&mut scopes, &mut doc, tab()));
        assert_eq!(doc.active_element(), Some(button2));

        // Backward mirrors it.
        assert!(press(&mut scopes, &mut doc, shift_tab()));
        assert_eq!(doc.active_element(), Some(radios[0]));
        assert!(press(&mut scopes, &mut doc, shift_tab()));
        assert_eq!(doc.active_element(), Some(button1));
    }

    #[test]
    fn test_unchecked_radio_group_keeps_tab_stops() {
        let mut doc = Document::new();
        let region = doc.create_child(doc.root(), "div");
        let r1 = doc.create_child(region, "input");
        doc.set_attribute(r1, "type", "radio");
        doc.set_attribute(r1, "name", "g");
        let r2 = doc.create_child(region, "input");
        doc.set_attribute(r2, "type", "radio");
        doc.set_attribute(r2, "name", "g");

        let mut scopes = FocusScopes::new();
        doc.focus(r1);
        scopes.mount(&mut doc, region, ScopeOptions::default().with_contain());

        assert!(press(&mut scopes, &mut doc, tab()));
        assert_eq!(doc.active_element(), Some(r2));
    }

    #[test]
    fn test_sibling_scope_cannot_steal_containment() {
        let mut doc = Document::new();
        let left = doc.create_child(doc.root(), "div");
        let left_input = doc.create_child(left, "input");
        let right = doc.create_child(doc.root(), "div");
        let right_input = doc.create_child(right, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(left_input);
        let left_id = scopes.mount(&mut doc, left, ScopeOptions::default().with_contain());
        scopes.mount(&mut doc, right, ScopeOptions::default().with_contain());
        assert_eq!(scopes.active_scope(), Some(left_id));

        // Programmatic focus into the sibling scope snaps back.
        doc.focus(right_input);
        scopes.handle_focus_in(&mut doc, &FocusEvent::new(right_input, Some(left_input)));
        assert_eq!(doc.active_element(), Some(left_input));
        assert_eq!(scopes.active_scope(), Some(left_id));
    }

    #[test]
    fn test_child_scope_may_take_focus() {
        let mut doc = Document::new();
        let outer = doc.create_child(doc.root(), "div");
        let outer_input = doc.create_child(outer, "input");
        let inner = doc.create_child(outer, "div");
        let inner_input = doc.create_child(inner, "input");

        let mut scopes = FocusScopes::new();
        doc.focus(outer_input);
        scopes.mount(&mut doc, outer, ScopeOptions::default().with_contain());
        let inner_id = scopes.mount(&mut doc, inner, ScopeOptions::default());

        doc.focus(inner_input);
        scopes.handle_focus_in(&mut doc, &FocusEvent::new(inner_input, Some(outer_input)));
        assert_eq!(doc.active_element(), Some(inner_input));
        assert_eq!(scopes.active_scope(), Some(inner_id));
    }

    #[test]
    fn test_focus_out_snaps_back_to_last_focused() {
        let mut doc = Document::new();
        let region = doc.create_child(doc.root(), "div");
        let a = doc.create_child(region, "input");
        let b = doc.create_child(region, "input");
        let outside = doc.create_child(doc.root(), "button");

        let mut scopes = FocusScopes::new();
        doc.focus(b);
        scopes.mount(&mut doc, region, ScopeOptions::default().with_contain());

        doc.blur();
        scopes.handle_focus_out(&mut doc, &FocusEvent::new(b, Some(outside)));
        assert_eq!(doc.active_element(), Some(b));
        let _ = a;
    }
}
