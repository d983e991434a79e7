//! Document-order tree walkers.
//!
//! [`TreeWalker`] is a resumable cursor over a subtree with DOM
//! `TreeWalker` semantics: a `what_to_show` mask, a filter returning
//! [`FilterResult::Accept`]/[`Skip`](FilterResult::Skip)/
//! [`Reject`](FilterResult::Reject) (reject prunes the whole subtree), and
//! `first_child` / `last_child` / `next_node` / `previous_node` movement
//! with a readable, settable current node. It walks light children only and
//! never enters shadow roots.
//!
//! [`ShadowTreeWalker`] presents the same contract over the composed tree:
//! whenever traversal reaches an element hosting a shadow root, it descends
//! into the shadow tree in place of the host (the host itself is not
//! yielded; its filter is still evaluated) and returns to the host's
//! siblings once the shadow subtree is exhausted. Internally it keeps an
//! explicit stack of plain walkers, one per shadow depth, rebuilt from a
//! path-to-root computation whenever the cursor is assigned directly.
//!
//! [`ElementWalker`] picks between the two at construction based on the
//! process-wide shadow-DOM capability flag, so hosts that never use shadow
//! roots pay none of the stack bookkeeping.

use std::cell::RefCell;
use std::rc::Rc;

use horizon_aria_core::capability;
use horizon_aria_core::document::{Document, NodeId, NodeKind};
use horizon_aria_core::error::{AriaError, AriaResult};
use horizon_aria_core::logging::targets;

/// Bitmask of node kinds a walker yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhatToShow(u32);

impl WhatToShow {
    /// Show every node kind.
    pub const ALL: Self = Self(u32::MAX);
    /// Show elements only.
    pub const ELEMENT: Self = Self(0x1);

    /// Whether the mask includes the given node kind.
    pub fn accepts(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Element => self.0 & 0x1 != 0,
            // Shadow roots are structural and never yielded.
            NodeKind::ShadowRoot => false,
        }
    }
}

/// Verdict of a walker filter for one candidate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Yield the node.
    Accept,
    /// Do not yield the node, but consider its descendants.
    Skip,
    /// Do not yield the node or anything beneath it.
    Reject,
}

/// A walker filter.
pub trait NodeFilter {
    /// Judge one candidate node.
    fn accept_node(&mut self, doc: &Document, node: NodeId) -> FilterResult;
}

impl<F> NodeFilter for F
where
    F: FnMut(&Document, NodeId) -> FilterResult,
{
    fn accept_node(&mut self, doc: &Document, node: NodeId) -> FilterResult {
        self(doc, node)
    }
}

/// Shared, dynamically-typed filter handle.
///
/// Walkers in a shadow stack share one filter; `Rc<RefCell<..>>` keeps the
/// sharing explicit and single-threaded.
pub type SharedFilter = Rc<RefCell<dyn NodeFilter>>;

/// Wrap a closure as a [`SharedFilter`].
pub fn filter_fn<F>(f: F) -> SharedFilter
where
    F: FnMut(&Document, NodeId) -> FilterResult + 'static,
{
    Rc::new(RefCell::new(f))
}

// =============================================================================
// Plain walker
// =============================================================================

/// A document-order walker over light children.
#[derive(Clone)]
pub struct TreeWalker {
    root: NodeId,
    what_to_show: WhatToShow,
    filter: Option<SharedFilter>,
    current: NodeId,
    /// When walking as part of a shadow stack, a host's light children are
    /// opaque; descent happens through the stacked shadow walker instead.
    hide_host_children: bool,
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field("root", &self.root)
            .field("current", &self.current)
            .finish()
    }
}

impl TreeWalker {
    /// Create a walker rooted at `root`.
    pub fn new(root: NodeId, what_to_show: WhatToShow, filter: Option<SharedFilter>) -> Self {
        Self {
            root,
            what_to_show,
            filter,
            current: root,
            hide_host_children: false,
        }
    }

    fn new_composed(root: NodeId, what_to_show: WhatToShow, filter: Option<SharedFilter>) -> Self {
        Self {
            hide_host_children: true,
            ..Self::new(root, what_to_show, filter)
        }
    }

    /// The walker's root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The current node.
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Set the current node.
    ///
    /// Fails with [`AriaError::NodeOutsideRoot`] if `node` is not the root
    /// or a light-tree descendant of it.
    pub fn set_current(&mut self, doc: &Document, node: NodeId) -> AriaResult<()> {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == self.root {
                self.current = node;
                return Ok(());
            }
            cursor = doc.get(id).and_then(|e| e.parent());
        }
        Err(AriaError::NodeOutsideRoot)
    }

    fn filter(&self, doc: &Document, node: NodeId) -> FilterResult {
        let Some(element) = doc.get(node) else {
            return FilterResult::Reject;
        };
        if !self.what_to_show.accepts(element.kind()) {
            return FilterResult::Skip;
        }
        match &self.filter {
            Some(f) => f.borrow_mut().accept_node(doc, node),
            None => FilterResult::Accept,
        }
    }

    fn children_of<'d>(&self, doc: &'d Document, node: NodeId) -> &'d [NodeId] {
        match doc.get(node) {
            Some(e) if self.hide_host_children && e.shadow_root().is_some() => &[],
            Some(e) => e.children(),
            None => &[],
        }
    }

    fn first_child_of(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        self.children_of(doc, node).first().copied()
    }

    fn last_child_of(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        self.children_of(doc, node).last().copied()
    }

    fn parent_of(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        doc.get(node).and_then(|e| e.parent())
    }

    fn sibling_of(&self, doc: &Document, node: NodeId, forward: bool) -> Option<NodeId> {
        let parent = self.parent_of(doc, node)?;
        let siblings = self.children_of(doc, parent);
        let index = siblings.iter().position(|&c| c == node)?;
        if forward {
            siblings.get(index + 1).copied()
        } else {
            index.checked_sub(1).and_then(|i| siblings.get(i).copied())
        }
    }

    /// Move to the first accepted child of the current node.
    pub fn first_child(&mut self, doc: &Document) -> Option<NodeId> {
        self.traverse_children(doc, true)
    }

    /// Move to the last accepted child of the current node.
    pub fn last_child(&mut self, doc: &Document) -> Option<NodeId> {
        self.traverse_children(doc, false)
    }

    fn traverse_children(&mut self, doc: &Document, forward: bool) -> Option<NodeId> {
        let start = self.current;
        let mut node = if forward {
            self.first_child_of(doc, start)
        } else {
            self.last_child_of(doc, start)
        }?;
        loop {
            match self.filter(doc, node) {
                FilterResult::Accept => {
                    self.current = node;
                    return Some(node);
                }
                FilterResult::Skip => {
                    let child = if forward {
                        self.first_child_of(doc, node)
                    } else {
                        self.last_child_of(doc, node)
                    };
                    if let Some(child) = child {
                        node = child;
                        continue;
                    }
                }
                FilterResult::Reject => {}
            }
            // Advance to a sibling, climbing back out of skipped subtrees
            // but never above the node we started from.
            loop {
                if let Some(sibling) = self.sibling_of(doc, node, forward) {
                    node = sibling;
                    break;
                }
                match self.parent_of(doc, node) {
                    None => return None,
                    Some(p) if p == start || p == self.root => return None,
                    Some(p) => node = p,
                }
            }
        }
    }

    /// Move to the next accepted node in document order.
    ///
    /// Returns `None` on exhaustion without moving the cursor.
    pub fn next_node(&mut self, doc: &Document) -> Option<NodeId> {
        let mut node = self.current;
        let mut result = FilterResult::Accept;
        loop {
            while result != FilterResult::Reject {
                let Some(child) = self.first_child_of(doc, node) else {
                    break;
                };
                node = child;
                result = self.filter(doc, node);
                if result == FilterResult::Accept {
                    self.current = node;
                    return Some(node);
                }
            }
            // Nearest following node that is not a descendant: a next
            // sibling of this node or of an ancestor below the root.
            let mut temp = node;
            let following = loop {
                if temp == self.root {
                    return None;
                }
                if let Some(sibling) = self.sibling_of(doc, temp, true) {
                    break sibling;
                }
                match self.parent_of(doc, temp) {
                    Some(p) => temp = p,
                    None => return None,
                }
            };
            node = following;
            result = self.filter(doc, node);
            if result == FilterResult::Accept {
                self.current = node;
                return Some(node);
            }
        }
    }

    /// Move to the previous accepted node in document order.
    ///
    /// Returns `None` on exhaustion without moving the cursor. May return
    /// the walker's root if the root itself is accepted.
    pub fn previous_node(&mut self, doc: &Document) -> Option<NodeId> {
        let mut node = self.current;
        while node != self.root {
            let mut sibling = self.sibling_of(doc, node, false);
            while let Some(s) = sibling {
                node = s;
                let mut result = self.filter(doc, node);
                // Descend to the deepest trailing node of this sibling.
                while result != FilterResult::Reject {
                    let Some(last) = self.last_child_of(doc, node) else {
                        break;
                    };
                    node = last;
                    result = self.filter(doc, node);
                }
                if result == FilterResult::Accept {
                    self.current = node;
                    return Some(node);
                }
                sibling = self.sibling_of(doc, node, false);
            }
            let Some(parent) = self.parent_of(doc, node) else {
                return None;
            };
            node = parent;
            if self.filter(doc, node) == FilterResult::Accept {
                self.current = node;
                return Some(node);
            }
        }
        None
    }
}

// =============================================================================
// Shadow-aware walker
// =============================================================================

/// Wrapping filter that forces traversal to stop on shadow hosts so the
/// shadow walker can take over, evaluating the user filter for parity.
struct HostAwareFilter {
    user: Option<SharedFilter>,
}

impl NodeFilter for HostAwareFilter {
    fn accept_node(&mut self, doc: &Document, node: NodeId) -> FilterResult {
        if doc.get(node).is_some_and(|e| e.shadow_root().is_some()) {
            if let Some(user) = &self.user {
                let _ = user.borrow_mut().accept_node(doc, node);
            }
            return FilterResult::Accept;
        }
        match &self.user {
            Some(f) => f.borrow_mut().accept_node(doc, node),
            None => FilterResult::Accept,
        }
    }
}

/// A walker over the composed tree: shadow roots are entered transparently.
pub struct ShadowTreeWalker {
    root: NodeId,
    what_to_show: WhatToShow,
    user_filter: Option<SharedFilter>,
    /// Shared host-aware filter installed in every stacked walker.
    stack_filter: SharedFilter,
    /// Innermost walker last; index 0 walks the tree rooted at `root`.
    stack: Vec<TreeWalker>,
    current: NodeId,
}

impl std::fmt::Debug for ShadowTreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowTreeWalker")
            .field("root", &self.root)
            .field("current", &self.current)
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl ShadowTreeWalker {
    /// Create a shadow-aware walker rooted at `root`.
    pub fn new(root: NodeId, what_to_show: WhatToShow, filter: Option<SharedFilter>) -> Self {
        let stack_filter: SharedFilter = Rc::new(RefCell::new(HostAwareFilter {
            user: filter.clone(),
        }));
        Self {
            root,
            what_to_show,
            user_filter: filter,
            stack_filter: stack_filter.clone(),
            stack: vec![TreeWalker::new_composed(
                root,
                what_to_show,
                Some(stack_filter),
            )],
            current: root,
        }
    }

    /// The walker's root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The current node.
    pub fn current(&self) -> NodeId {
        self.current
    }

    fn is_shadow_host(&self, doc: &Document, node: NodeId) -> bool {
        doc.get(node).is_some_and(|e| e.shadow_root().is_some())
    }

    fn push_shadow(&mut self, doc: &Document, host: NodeId) {
        if let Some(shadow) = doc.get(host).and_then(|e| e.shadow_root()) {
            tracing::trace!(target: targets::WALKER, ?host, "descending into shadow root");
            self.stack.push(TreeWalker::new_composed(
                shadow,
                self.what_to_show,
                Some(self.stack_filter.clone()),
            ));
        }
    }

    /// Set the current node, rebuilding the walker stack from the node's
    /// path to the root.
    ///
    /// Fails with [`AriaError::NodeOutsideRoot`] if `node` is not contained
    /// by the root in the composed tree.
    pub fn set_current(&mut self, doc: &Document, node: NodeId) -> AriaResult<()> {
        if !doc.contains(self.root, node) {
            return Err(AriaError::NodeOutsideRoot);
        }
        // Collect the shadow roots crossed between the node and the root,
        // innermost first.
        let mut boundaries = Vec::new();
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == self.root {
                break;
            }
            if doc.get(id).map(|e| e.kind()) == Some(NodeKind::ShadowRoot) {
                boundaries.push(id);
            }
            cursor = doc.composed_parent(id);
        }
        boundaries.reverse();

        let mut stack = vec![TreeWalker::new_composed(
            self.root,
            self.what_to_show,
            Some(self.stack_filter.clone()),
        )];
        // Each outer walker parks on the host whose shadow tree the next
        // walker covers; a plain walker cannot jump into a shadow tree.
        for shadow in &boundaries {
            let host = doc
                .get(*shadow)
                .and_then(|e| e.host())
                .ok_or(AriaError::DanglingNode)?;
            let outer = stack.last_mut().expect("stack is never empty");
            outer.set_current(doc, host)?;
            stack.push(TreeWalker::new_composed(
                *shadow,
                self.what_to_show,
                Some(self.stack_filter.clone()),
            ));
        }
        stack
            .last_mut()
            .expect("stack is never empty")
            .set_current(doc, node)?;
        self.stack = stack;
        self.current = node;
        Ok(())
    }

    /// Move to the next accepted node in composed document order.
    pub fn next_node(&mut self, doc: &Document) -> Option<NodeId> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next_node(doc) {
                Some(node) => {
                    if self.is_shadow_host(doc, node) {
                        // Hosts are never yielded; continue inside the
                        // shadow tree in their place.
                        self.push_shadow(doc, node);
                        continue;
                    }
                    self.current = node;
                    return Some(node);
                }
                None => {
                    if self.stack.len() > 1 {
                        self.stack.pop();
                        continue;
                    }
                    return None;
                }
            }
        }
    }

    /// Move to the previous accepted node in composed document order.
    pub fn previous_node(&mut self, doc: &Document) -> Option<NodeId> {
        loop {
            let top = self.stack.last_mut()?;
            match top.previous_node(doc) {
                Some(node) => {
                    if self.is_shadow_host(doc, node) {
                        // Enter the host's shadow tree from its end.
                        self.push_shadow(doc, node);
                        if let Some(last) = self.tail_position(doc) {
                            self.current = last;
                            return Some(last);
                        }
                        // Empty shadow tree: resume before the host.
                        self.stack.pop();
                        continue;
                    }
                    self.current = node;
                    return Some(node);
                }
                None => {
                    if self.stack.len() > 1 {
                        self.stack.pop();
                        continue;
                    }
                    return None;
                }
            }
        }
    }

    /// Position the stack at the last accepted node within the top
    /// walker's tree, descending nested shadow trees. Returns `None` and
    /// leaves the stack depth unchanged if nothing matches.
    fn tail_position(&mut self, doc: &Document) -> Option<NodeId> {
        let depth = self.stack.len();
        let mut found = None;
        loop {
            let top = self.stack.last_mut().expect("stack is never empty");
            match top.last_child(doc) {
                Some(node) if self.is_shadow_host(doc, node) => {
                    self.push_shadow(doc, node);
                    if let Some(inner) = self.tail_position(doc) {
                        found = Some(inner);
                        continue;
                    }
                    // Host's shadow tree has no match: step back past the
                    // host within this walker.
                    self.stack.pop();
                    let top = self.stack.last_mut().expect("stack is never empty");
                    match top.previous_node(doc) {
                        Some(prev) if self.is_shadow_host(doc, prev) => {
                            self.push_shadow(doc, prev);
                            if let Some(inner) = self.tail_position(doc) {
                                found = Some(inner);
                                continue;
                            }
                            self.stack.pop();
                            break;
                        }
                        Some(prev) => {
                            found = Some(prev);
                            continue;
                        }
                        None => break,
                    }
                }
                Some(node) => {
                    found = Some(node);
                    continue;
                }
                None => break,
            }
        }
        if found.is_none() {
            self.stack.truncate(depth);
        }
        found
    }

    /// Move to the first accepted node within the current node's subtree.
    pub fn first_child(&mut self, doc: &Document) -> Option<NodeId> {
        let start = self.current;
        let mut sub = ShadowTreeWalker::new(start, self.what_to_show, self.user_filter.clone());
        let found = sub.next_node(doc)?;
        // Adopt the found position in this walker's own stack.
        self.set_current(doc, found).ok()?;
        Some(found)
    }

    /// Move to the last accepted node within the current node's subtree.
    pub fn last_child(&mut self, doc: &Document) -> Option<NodeId> {
        let start = self.current;
        let mut sub = ShadowTreeWalker::new(start, self.what_to_show, self.user_filter.clone());
        let found = sub.tail_position(doc)?;
        self.set_current(doc, found).ok()?;
        Some(found)
    }
}

// =============================================================================
// Capability-switched wrapper
// =============================================================================

/// A walker that is shadow-aware only when the process-wide shadow-DOM
/// capability is enabled; otherwise it is a zero-overhead plain walker with
/// identical observable behavior on shadow-free trees.
pub enum ElementWalker {
    Native(TreeWalker),
    Shadow(ShadowTreeWalker),
}

impl std::fmt::Debug for ElementWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native(w) => w.fmt(f),
            Self::Shadow(w) => w.fmt(f),
        }
    }
}

impl ElementWalker {
    /// Create a walker, consulting the shadow-DOM capability flag.
    pub fn new(root: NodeId, what_to_show: WhatToShow, filter: Option<SharedFilter>) -> Self {
        if capability::shadow_dom_enabled() {
            Self::Shadow(ShadowTreeWalker::new(root, what_to_show, filter))
        } else {
            Self::Native(TreeWalker::new(root, what_to_show, filter))
        }
    }

    /// The current node.
    pub fn current(&self) -> NodeId {
        match self {
            Self::Native(w) => w.current(),
            Self::Shadow(w) => w.current(),
        }
    }

    /// Set the current node. See [`TreeWalker::set_current`].
    pub fn set_current(&mut self, doc: &Document, node: NodeId) -> AriaResult<()> {
        match self {
            Self::Native(w) => w.set_current(doc, node),
            Self::Shadow(w) => w.set_current(doc, node),
        }
    }

    /// Move to the next accepted node.
    pub fn next_node(&mut self, doc: &Document) -> Option<NodeId> {
        match self {
            Self::Native(w) => w.next_node(doc),
            Self::Shadow(w) => w.next_node(doc),
        }
    }

    /// Move to the previous accepted node.
    pub fn previous_node(&mut self, doc: &Document) -> Option<NodeId> {
        match self {
            Self::Native(w) => w.previous_node(doc),
            Self::Shadow(w) => w.previous_node(doc),
        }
    }

    /// Move to the first accepted node in the current subtree.
    pub fn first_child(&mut self, doc: &Document) -> Option<NodeId> {
        match self {
            Self::Native(w) => w.first_child(doc),
            Self::Shadow(w) => w.first_child(doc),
        }
    }

    /// Move to the last accepted node in the current subtree.
    pub fn last_child(&mut self, doc: &Document) -> Option<NodeId> {
        match self {
            // A plain walker's last_child is one level deep; descend
            // repeatedly to reach the subtree's document-order last.
            Self::Native(w) => {
                let mut last = None;
                while let Some(n) = w.last_child(doc) {
                    last = Some(n);
                }
                last
            }
            Self::Shadow(w) => w.last_child(doc),
        }
    }
}
