//! Retained element tree for the behavior engine.
//!
//! Provides the document the engine navigates over:
//! - Unique node identifiers via arena-based storage
//! - Parent-child relationships, including shadow roots attached to hosts
//! - Attributes, with a maintained `data-key` lookup index
//! - The style and geometry facts navigation needs (display/visibility
//!   flags, layout rects, scroll offsets), written by the host's layout
//!   pass and read here
//! - The active (focused) element
//!
//! The engine never owns rendering; this tree is the contract between a
//! host framework that renders elements and the behavior layer that decides
//! where focus and selection go.
//!
//! # Shadow roots
//!
//! A shadow root is a node of kind [`NodeKind::ShadowRoot`] stored in the
//! same arena. Its `parent` link is `None`; it reaches its host through a
//! dedicated host link, and [`Document::composed_parent`] crosses that
//! boundary. Once a shadow root is attached, traversal descends the shadow
//! tree and ignores the host's light children (slot assignment is out of
//! scope for this engine).

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::error::{AriaError, AriaResult};
use crate::geometry::{Point, Rect, Size};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a node in a [`Document`].
    ///
    /// `NodeId`s are stable handles that remain valid as the tree changes
    /// around them. They become invalid when the node is removed.
    pub struct NodeId;
}

/// The kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular element.
    Element,
    /// A shadow root attached to a host element.
    ShadowRoot,
}

/// CSS visibility values relevant to focusability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

/// The computed-style facts the engine consults.
///
/// The host's style system resolves real CSS; only the bits that affect
/// focusability are mirrored here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementStyle {
    /// `display: none`.
    pub display_none: bool,
    /// `visibility` value.
    pub visibility: Visibility,
}

/// One node in the document arena.
#[derive(Debug)]
pub struct Element {
    kind: NodeKind,
    tag: String,
    attributes: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    shadow_root: Option<NodeId>,
    /// For `ShadowRoot` nodes: the element hosting this root.
    host: Option<NodeId>,
    style: ElementStyle,
    rect: Option<Rect>,
    scroll: Point,
    content_size: Size,
    checked: bool,
}

impl Element {
    fn new(kind: NodeKind, tag: impl Into<String>) -> Self {
        Self {
            kind,
            tag: tag.into(),
            attributes: HashMap::new(),
            parent: None,
            children: Vec::new(),
            shadow_root: None,
            host: None,
            style: ElementStyle::default(),
            rect: None,
            scroll: Point::ZERO,
            content_size: Size::ZERO,
            checked: false,
        }
    }

    /// The node kind.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Lowercase tag name (empty for shadow roots).
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The parent node within the same tree, if any.
    ///
    /// Shadow roots have no parent; use [`Document::composed_parent`] to
    /// cross to the host.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Light-tree children in order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The shadow root attached to this element, if any.
    #[inline]
    pub fn shadow_root(&self) -> Option<NodeId> {
        self.shadow_root
    }

    /// For shadow roots, the host element.
    #[inline]
    pub fn host(&self) -> Option<NodeId> {
        self.host
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether an attribute is present (regardless of value).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// The parsed `tabindex` attribute, if present and numeric.
    pub fn tabindex(&self) -> Option<i32> {
        self.attribute("tabindex").and_then(|v| v.trim().parse().ok())
    }

    /// Whether the `disabled` attribute is present.
    pub fn is_disabled(&self) -> bool {
        self.has_attribute("disabled")
    }

    /// Whether the `hidden` attribute is present.
    pub fn has_hidden_attribute(&self) -> bool {
        self.has_attribute("hidden")
    }

    /// Whether the `inert` attribute is present on this element.
    pub fn is_inert(&self) -> bool {
        self.has_attribute("inert")
    }

    /// Whether the element is editable content
    /// (`contenteditable` present and not `"false"`).
    pub fn is_content_editable(&self) -> bool {
        matches!(self.attribute("contenteditable"), Some(v) if !v.eq_ignore_ascii_case("false"))
    }

    /// The style facts for this element.
    #[inline]
    pub fn style(&self) -> ElementStyle {
        self.style
    }

    /// Layout rectangle in viewport coordinates, if the host laid the
    /// element out.
    #[inline]
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Current scroll offset of this element's content.
    #[inline]
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Total scrollable content size (`scrollWidth`/`scrollHeight`).
    #[inline]
    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// Checked state (radios, checkboxes).
    #[inline]
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Whether this is an `<input type="radio">`.
    pub fn is_radio(&self) -> bool {
        self.tag == "input"
            && self
                .attribute("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
    }

    /// The radio group name, if any.
    pub fn radio_group(&self) -> Option<&str> {
        if self.is_radio() {
            self.attribute("name").filter(|n| !n.is_empty())
        } else {
            None
        }
    }
}

/// Arena-backed document tree.
#[derive(Debug)]
pub struct Document {
    nodes: SlotMap<NodeId, Element>,
    root: NodeId,
    active_element: Option<NodeId>,
    /// `data-key` attribute value to node, maintained on attribute writes.
    data_key_index: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document with an empty `body` root.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Element::new(NodeKind::Element, "body"));
        Self {
            nodes,
            root,
            active_element: None,
            data_key_index: HashMap::new(),
        }
    }

    /// The root element of the document.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by id.
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    /// Number of live nodes, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds no nodes beyond the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // =========================================================================
    // Tree construction
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes
            .insert(Element::new(NodeKind::Element, tag.to_ascii_lowercase()))
    }

    /// Create an element and append it to `parent`.
    pub fn create_child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create_element(tag);
        self.append_child(parent, id);
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// Detaches the child from its previous parent first. No-op if either
    /// node does not exist or the append would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return;
        }
        if parent == child || self.contains(child, parent) {
            tracing::debug!(target: targets::DOCUMENT, "rejected cyclic append");
            return;
        }
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Attach a shadow root to `host` and return it.
    pub fn attach_shadow(&mut self, host: NodeId) -> AriaResult<NodeId> {
        let element = self.nodes.get(host).ok_or(AriaError::DanglingNode)?;
        if element.shadow_root.is_some() {
            return Err(AriaError::ShadowRootExists);
        }
        let root = self.nodes.insert(Element::new(NodeKind::ShadowRoot, ""));
        self.nodes[root].host = Some(host);
        self.nodes[host].shadow_root = Some(root);
        Ok(root)
    }

    /// Remove a node and its entire subtree (shadow trees included).
    ///
    /// Clears the active element and any `data-key` index entries that
    /// pointed into the removed subtree.
    pub fn remove_node(&mut self, node: NodeId) {
        if node == self.root || !self.nodes.contains_key(node) {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(element) = self.nodes.remove(id) {
                stack.extend(element.children.iter().copied());
                if let Some(shadow) = element.shadow_root {
                    stack.push(shadow);
                }
                if let Some(key) = element.attributes.get("data-key") {
                    self.data_key_index.remove(key);
                }
                if self.active_element == Some(id) {
                    self.active_element = None;
                }
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
    }

    // =========================================================================
    // Attributes and state
    // =========================================================================

    /// Set an attribute value.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.nodes.get_mut(node) else {
            return;
        };
        if name == "data-key" {
            if let Some(old) = element.attributes.get("data-key").cloned() {
                self.data_key_index.remove(&old);
            }
            self.data_key_index.insert(value.to_string(), node);
        }
        // Borrow was dropped by the index bookkeeping above; re-borrow.
        if let Some(element) = self.nodes.get_mut(node) {
            element.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Remove an attribute.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(element) = self.nodes.get_mut(node) else {
            return;
        };
        if let Some(value) = element.attributes.remove(name) {
            if name == "data-key" {
                self.data_key_index.remove(&value);
            }
        }
    }

    /// Find the element carrying a given `data-key` attribute value.
    pub fn element_by_data_key(&self, key: &str) -> Option<NodeId> {
        self.data_key_index.get(key).copied()
    }

    /// Update the style facts for an element.
    pub fn set_style(&mut self, node: NodeId, style: ElementStyle) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.style = style;
        }
    }

    /// Set or clear `display: none`.
    pub fn set_display_none(&mut self, node: NodeId, display_none: bool) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.style.display_none = display_none;
        }
    }

    /// Set the visibility value.
    pub fn set_visibility(&mut self, node: NodeId, visibility: Visibility) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.style.visibility = visibility;
        }
    }

    /// Record the layout rectangle for an element.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.rect = Some(rect);
        }
    }

    /// Record the scroll offset for an element.
    pub fn set_scroll(&mut self, node: NodeId, scroll: Point) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.scroll = scroll;
        }
    }

    /// Record the scrollable content size for an element.
    pub fn set_content_size(&mut self, node: NodeId, size: Size) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.content_size = size;
        }
    }

    /// Whether an element's content overflows its layout rect.
    pub fn is_scrollable(&self, node: NodeId) -> bool {
        let Some(element) = self.nodes.get(node) else {
            return false;
        };
        let Some(rect) = element.rect else {
            return false;
        };
        element.content_size.height > rect.height() || element.content_size.width > rect.width()
    }

    /// Set the checked state of a radio or checkbox.
    pub fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(element) = self.nodes.get_mut(node) {
            element.checked = checked;
        }
    }

    /// Check a radio, unchecking every other attached radio in its group.
    pub fn check_radio(&mut self, node: NodeId) {
        let Some(group) = self
            .nodes
            .get(node)
            .and_then(|e| e.radio_group().map(str::to_string))
        else {
            self.set_checked(node, true);
            return;
        };
        let peers: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(id, e)| *id != node && e.radio_group() == Some(group.as_str()))
            .map(|(id, _)| id)
            .collect();
        for peer in peers {
            self.set_checked(peer, false);
        }
        self.set_checked(node, true);
    }

    /// The checked member of a radio group, if any is attached.
    pub fn checked_radio_in_group(&self, group: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(id, e)| {
                e.is_checked() && e.radio_group() == Some(group) && self.is_attached(*id)
            })
            .map(|(id, _)| id)
    }

    // =========================================================================
    // Focus state
    // =========================================================================

    /// The element that currently holds focus, if any.
    #[inline]
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    /// Move focus to `node`.
    ///
    /// Best effort: focusing a node that does not exist or is not an
    /// element is a silent no-op returning `false`. The document and the
    /// host's render cycle can transiently disagree about what exists, so
    /// this never errors.
    pub fn focus(&mut self, node: NodeId) -> bool {
        match self.nodes.get(node) {
            Some(element) if element.kind == NodeKind::Element => {
                if self.active_element != Some(node) {
                    tracing::debug!(target: targets::DOCUMENT, ?node, "focus moved");
                    self.active_element = Some(node);
                }
                true
            }
            _ => false,
        }
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.active_element = None;
    }

    // =========================================================================
    // Tree queries
    // =========================================================================

    /// The parent in the composed tree: the light parent, or for a shadow
    /// root, its host.
    pub fn composed_parent(&self, node: NodeId) -> Option<NodeId> {
        let element = self.nodes.get(node)?;
        element.parent.or(element.host)
    }

    /// Whether `node` is `ancestor` or a composed-tree descendant of it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.composed_parent(id);
        }
        false
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node) && self.contains(self.root, node)
    }

    /// Path of child indices from the root to `node`, crossing shadow
    /// boundaries. Shadow-root steps use index 0; once a shadow root is
    /// attached the host's light children are not traversed, so the
    /// overlap is harmless.
    fn tree_path(&self, node: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.composed_parent(current) {
            let index = match self.nodes.get(current).map(|e| e.kind) {
                Some(NodeKind::ShadowRoot) => 0,
                _ => self
                    .nodes
                    .get(parent)
                    .and_then(|p| p.children.iter().position(|&c| c == current))
                    .unwrap_or(0),
            };
            path.push(index);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Compare two nodes by composed document order.
    ///
    /// An ancestor orders before its descendants. Detached nodes compare
    /// by their position within whatever subtree they share.
    pub fn compare_position(&self, a: NodeId, b: NodeId) -> std::cmp::Ordering {
        if a == b {
            return std::cmp::Ordering::Equal;
        }
        self.tree_path(a).cmp(&self.tree_path(b))
    }

    /// Whether `a` precedes `b` in composed document order.
    pub fn is_before(&self, a: NodeId, b: NodeId) -> bool {
        self.compare_position(a, b) == std::cmp::Ordering::Less
    }
}
