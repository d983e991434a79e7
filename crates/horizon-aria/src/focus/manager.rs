//! Programmatic focus movement within a subtree.
//!
//! A [`FocusManager`] is bound to one root element and moves focus among
//! its focusable (or tabbable) descendants using the shadow-aware walker.
//! Every operation is best effort: when nothing matches, it returns `None`
//! and leaves the document untouched.
//!
//! # Example
//!
//! ```
//! use horizon_aria::focus::{FocusManager, FocusOptions};
//! use horizon_aria_core::Document;
//!
//! let mut doc = Document::new();
//! let toolbar = doc.create_child(doc.root(), "div");
//! let save = doc.create_child(toolbar, "button");
//! let undo = doc.create_child(toolbar, "button");
//!
//! let manager = FocusManager::new(toolbar);
//! assert_eq!(
//!     manager.focus_first(&mut doc, &FocusOptions::default()),
//!     Some(save)
//! );
//! assert_eq!(
//!     manager.focus_next(&mut doc, &FocusOptions::default()),
//!     Some(undo)
//! );
//! ```

use std::rc::Rc;

use horizon_aria_core::document::{Document, NodeId};
use horizon_aria_core::logging::targets;

use crate::dom::focusability::focus_filter_result;
use crate::dom::walker::{filter_fn, ElementWalker, FilterResult, SharedFilter, WhatToShow};

/// Extra caller-supplied predicate ANDed into the focus filter.
pub type AcceptFn = Rc<dyn Fn(&Document, NodeId) -> bool>;

/// Options for a single focus-movement call.
#[derive(Clone, Default)]
pub struct FocusOptions {
    /// Start the walk from this node instead of the active element.
    pub from: Option<NodeId>,
    /// Consider only tabbable elements rather than all focusable ones.
    pub tabbable: bool,
    /// Wrap around at the root boundary when the walk is exhausted.
    pub wrap: bool,
    /// Additional filter a candidate must satisfy.
    pub accept: Option<AcceptFn>,
}

impl std::fmt::Debug for FocusOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusOptions")
            .field("from", &self.from)
            .field("tabbable", &self.tabbable)
            .field("wrap", &self.wrap)
            .field("accept", &self.accept.is_some())
            .finish()
    }
}

impl FocusOptions {
    /// Options considering only tabbable elements.
    pub fn tabbable() -> Self {
        Self {
            tabbable: true,
            ..Self::default()
        }
    }

    /// Set the starting node.
    pub fn with_from(mut self, from: NodeId) -> Self {
        self.from = Some(from);
        self
    }

    /// Enable wraparound at the root boundary.
    pub fn with_wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    /// Add a caller-supplied accept predicate.
    pub fn with_accept<F>(mut self, accept: F) -> Self
    where
        F: Fn(&Document, NodeId) -> bool + 'static,
    {
        self.accept = Some(Rc::new(accept));
        self
    }
}

/// Moves focus among the focusable descendants of one root.
#[derive(Debug, Clone, Copy)]
pub struct FocusManager {
    root: NodeId,
}

impl FocusManager {
    /// Create a manager scoped to `root`'s subtree.
    pub fn new(root: NodeId) -> Self {
        Self { root }
    }

    /// The subtree root this manager walks.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn filter(&self, opts: &FocusOptions) -> SharedFilter {
        let tabbable = opts.tabbable;
        let accept = opts.accept.clone();
        filter_fn(move |doc: &Document, node: NodeId| {
            let result = focus_filter_result(doc, node, tabbable);
            if result == FilterResult::Accept {
                if let Some(accept) = &accept {
                    if !accept(doc, node) {
                        return FilterResult::Skip;
                    }
                }
            }
            result
        })
    }

    fn walker(&self, opts: &FocusOptions) -> ElementWalker {
        ElementWalker::new(self.root, WhatToShow::ELEMENT, Some(self.filter(opts)))
    }

    /// Focus the first matching descendant.
    pub fn focus_first(&self, doc: &mut Document, opts: &FocusOptions) -> Option<NodeId> {
        let mut walker = self.walker(opts);
        let found = walker.next_node(doc)?;
        tracing::debug!(target: targets::FOCUS, ?found, "focus first");
        doc.focus(found);
        Some(found)
    }

    /// Focus the last matching descendant.
    pub fn focus_last(&self, doc: &mut Document, opts: &FocusOptions) -> Option<NodeId> {
        let mut walker = self.walker(opts);
        let found = walker.last_child(doc)?;
        tracing::debug!(target: targets::FOCUS, ?found, "focus last");
        doc.focus(found);
        Some(found)
    }

    fn start_point(&self, doc: &Document, opts: &FocusOptions) -> Option<NodeId> {
        opts.from
            .or_else(|| doc.active_element())
            .filter(|&from| doc.contains(self.root, from))
    }

    /// Focus the next matching descendant after the starting point.
    ///
    /// Starts from `opts.from`, or the active element if it lies inside the
    /// root; with no usable start this behaves as [`focus_first`].
    ///
    /// [`focus_first`]: FocusManager::focus_first
    pub fn focus_next(&self, doc: &mut Document, opts: &FocusOptions) -> Option<NodeId> {
        let Some(from) = self.start_point(doc, opts) else {
            return self.focus_first(doc, opts);
        };
        let mut walker = self.walker(opts);
        if walker.set_current(doc, from).is_err() {
            return self.focus_first(doc, opts);
        }
        let found = match walker.next_node(doc) {
            Some(found) => found,
            None if opts.wrap => self.walker(opts).next_node(doc)?,
            None => return None,
        };
        doc.focus(found);
        Some(found)
    }

    /// Focus the previous matching descendant before the starting point.
    ///
    /// With no usable start this behaves as [`focus_last`].
    ///
    /// [`focus_last`]: FocusManager::focus_last
    pub fn focus_previous(&self, doc: &mut Document, opts: &FocusOptions) -> Option<NodeId> {
        let Some(from) = self.start_point(doc, opts) else {
            return self.focus_last(doc, opts);
        };
        let mut walker = self.walker(opts);
        if walker.set_current(doc, from).is_err() {
            return self.focus_last(doc, opts);
        }
        let found = match walker.previous_node(doc) {
            Some(found) => found,
            None if opts.wrap => self.walker(opts).last_child(doc)?,
            None => return None,
        };
        doc.focus(found);
        Some(found)
    }
}
