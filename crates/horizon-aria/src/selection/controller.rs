//! The selectable-collection controller.
//!
//! Binds key and focus events on a collection's container to a keyboard
//! delegate (which answers "where does focus go") and a
//! [`SelectionManager`] (which decides what that movement does to the
//! selection). One keystroke flows through a fixed sequence: compute the
//! candidate key, move the logical focused key, apply the selection
//! consequence, then apply DOM side effects (element focus, scrolling).
//! Later handlers such as typeahead read the already-updated focused key.
//!
//! The controller borrows its collaborators per call through
//! [`CollectionContext`]; it owns no collection or selection state itself.

use horizon_aria_core::document::{Document, NodeId};
use horizon_aria_core::logging::targets;

use crate::collection::key::Key;
use crate::collection::traits::Collection;
use crate::delegate::KeyboardDelegate;
use crate::event::{FocusEvent, KeyCode, KeyEvent, Modality, Modifiers, Platform};
use crate::focus::{FocusManager, FocusOptions};
use crate::layout::{scroll_into_view, LayoutDelegate};
use crate::selection::manager::{SelectionBehavior, SelectionManager, SelectionMode};
use crate::selection::typeahead::Typeahead;

/// What Escape does to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeKeyBehavior {
    /// Escape clears the selection (default).
    #[default]
    Clear,
    /// Escape is ignored.
    None,
}

/// How link items interact with selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkBehavior {
    /// Links select like ordinary items; activation is the host's job.
    #[default]
    Action,
    /// Navigating onto a link opens it through the router instead of
    /// mutating the selection.
    Selection,
    /// Links receive focus but never participate in selection.
    Override,
}

/// Opens link items on behalf of the controller.
pub trait Router {
    /// Navigate to `href`, honoring the modifier flags of the triggering
    /// event (new-tab conventions and the like).
    fn open(&mut self, href: &str, modifiers: Modifiers);
}

/// Static configuration for one selectable collection.
#[derive(Debug, Clone, Default)]
pub struct SelectableCollectionOptions {
    /// Arrow navigation wraps at the collection boundary.
    pub should_focus_wrap: bool,
    /// Whether navigation selects the focused item. Defaults to true
    /// exactly when the selection behavior is `Replace`.
    pub select_on_focus: Option<bool>,
    /// What Escape does.
    pub escape_key_behavior: EscapeKeyBehavior,
    /// Disable the typeahead sub-handler.
    pub disallow_typeahead: bool,
    /// Let Tab leave the widget instead of redirecting to the last
    /// tabbable descendant.
    pub allows_tab_navigation: bool,
    /// Disable Ctrl+A / Cmd+A.
    pub disallow_select_all: bool,
    /// How link items behave.
    pub link_behavior: LinkBehavior,
    /// Focus is tracked virtually (assistive tech); the controller never
    /// moves real DOM focus to items.
    pub virtual_focus: bool,
}

/// Per-call borrows of the controller's collaborators.
pub struct CollectionContext<'a> {
    pub doc: &'a mut Document,
    pub collection: &'a dyn Collection,
    pub delegate: &'a dyn KeyboardDelegate,
    pub manager: &'a mut SelectionManager,
    pub layout: Option<&'a dyn LayoutDelegate>,
    pub router: Option<&'a mut dyn Router>,
}

/// Event-handling state machine for one collection container.
pub struct SelectableCollection {
    root: NodeId,
    options: SelectableCollectionOptions,
    platform: Platform,
    typeahead: Typeahead,
}

impl SelectableCollection {
    /// Create a controller bound to `root` with default options.
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            options: SelectableCollectionOptions::default(),
            platform: Platform::current(),
            typeahead: Typeahead::new(),
        }
    }

    /// Set the controller options.
    pub fn with_options(mut self, options: SelectableCollectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the platform modifier conventions.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// The bound container element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Reset the typeahead search buffer (host debounce expired).
    pub fn clear_typeahead(&mut self) {
        self.typeahead.clear();
    }

    fn select_on_focus(&self, manager: &SelectionManager) -> bool {
        self.options
            .select_on_focus
            .unwrap_or(manager.selection_behavior() == SelectionBehavior::Replace)
    }

    // =========================================================================
    // Keydown
    // =========================================================================

    /// Route one keydown through navigation, selection, and typeahead.
    pub fn handle_key_down(&mut self, ctx: &mut CollectionContext<'_>, event: &mut KeyEvent) {
        if let Some(target) = event.target
            && !ctx.doc.contains(self.root, target)
        {
            return;
        }
        let focused = ctx.manager.focused_key().cloned();
        let wrap = self.options.should_focus_wrap;

        match event.code {
            KeyCode::ArrowDown => {
                let next = match &focused {
                    Some(key) => ctx
                        .delegate
                        .key_below(ctx.doc, key)
                        .or_else(|| wrap.then(|| ctx.delegate.first_key(ctx.doc)).flatten()),
                    None => ctx.delegate.first_key(ctx.doc),
                };
                if let Some(next) = next {
                    event.base.prevent_default();
                    self.navigate(ctx, event, next);
                }
            }
            KeyCode::ArrowUp => {
                let next = match &focused {
                    Some(key) => ctx
                        .delegate
                        .key_above(ctx.doc, key)
                        .or_else(|| wrap.then(|| ctx.delegate.last_key(ctx.doc)).flatten()),
                    None => ctx.delegate.last_key(ctx.doc),
                };
                if let Some(next) = next {
                    event.base.prevent_default();
                    self.navigate(ctx, event, next);
                }
            }
            KeyCode::ArrowRight => {
                let next = match &focused {
                    Some(key) => ctx
                        .delegate
                        .key_right_of(ctx.doc, key)
                        .or_else(|| wrap.then(|| ctx.delegate.first_key(ctx.doc)).flatten()),
                    None => ctx.delegate.first_key(ctx.doc),
                };
                if let Some(next) = next {
                    event.base.prevent_default();
                    self.navigate(ctx, event, next);
                }
            }
            KeyCode::ArrowLeft => {
                let next = match &focused {
                    Some(key) => ctx
                        .delegate
                        .key_left_of(ctx.doc, key)
                        .or_else(|| wrap.then(|| ctx.delegate.last_key(ctx.doc)).flatten()),
                    None => ctx.delegate.last_key(ctx.doc),
                };
                if let Some(next) = next {
                    event.base.prevent_default();
                    self.navigate(ctx, event, next);
                }
            }
            KeyCode::Home => {
                if let Some(key) = ctx.delegate.first_key(ctx.doc) {
                    event.base.prevent_default();
                    self.jump(ctx, event, key);
                }
            }
            KeyCode::End => {
                if let Some(key) = ctx.delegate.last_key(ctx.doc) {
                    event.base.prevent_default();
                    self.jump(ctx, event, key);
                }
            }
            KeyCode::PageDown => {
                if let Some(key) = focused
                    .as_ref()
                    .and_then(|k| ctx.delegate.key_page_below(ctx.doc, k))
                {
                    event.base.prevent_default();
                    self.navigate(ctx, event, key);
                }
            }
            KeyCode::PageUp => {
                if let Some(key) = focused
                    .as_ref()
                    .and_then(|k| ctx.delegate.key_page_above(ctx.doc, k))
                {
                    event.base.prevent_default();
                    self.navigate(ctx, event, key);
                }
            }
            KeyCode::Character('a')
                if self.platform.is_ctrl_key_pressed(event.modifiers) =>
            {
                if ctx.manager.selection_mode() == SelectionMode::Multiple
                    && !self.options.disallow_select_all
                {
                    event.base.prevent_default();
                    ctx.manager.select_all(ctx.collection);
                }
            }
            KeyCode::Escape => {
                if self.options.escape_key_behavior == EscapeKeyBehavior::Clear
                    && !ctx.manager.is_empty()
                {
                    event.base.prevent_default();
                    ctx.manager.clear_selection(ctx.collection);
                }
            }
            KeyCode::Tab if !self.options.allows_tab_navigation => {
                // Redirect without preventDefault: the browser then tabs
                // onward from the redirected position, so Tab reaches any
                // trailing focus target before leaving the widget.
                if event.modifiers.shift {
                    ctx.doc.focus(self.root);
                } else {
                    FocusManager::new(self.root)
                        .focus_last(ctx.doc, &FocusOptions::tabbable());
                }
            }
            KeyCode::Character(_) | KeyCode::Space => {
                if !self.options.disallow_typeahead {
                    self.typeahead
                        .handle_key_down(ctx.doc, ctx.delegate, ctx.manager, event);
                    if let Some(key) = ctx.manager.focused_key().cloned() {
                        self.focus_item(ctx, &key, true);
                    }
                }
            }
            _ => {}
        }
    }

    /// The shared navigate step for directional keys.
    fn navigate(&self, ctx: &mut CollectionContext<'_>, event: &KeyEvent, key: Key) {
        let select_on_focus = self.select_on_focus(ctx.manager);
        let non_contiguous = self.platform.is_non_contiguous_modifier(event.modifiers);
        let href = ctx
            .collection
            .item(&key)
            .and_then(|n| n.href().map(str::to_owned));

        if let Some(href) = &href
            && self.options.link_behavior == LinkBehavior::Selection
            && select_on_focus
            && !non_contiguous
        {
            tracing::debug!(target: targets::SELECTION, %key, href, "opening link item");
            if let Some(router) = ctx.router.as_deref_mut() {
                router.open(href, event.modifiers);
            }
            ctx.manager.set_focused_key(Some(key.clone()));
            self.focus_item(ctx, &key, true);
            return;
        }

        ctx.manager.set_focused_key(Some(key.clone()));
        let link_override = href.is_some() && self.options.link_behavior == LinkBehavior::Override;
        if !non_contiguous && !link_override {
            if event.modifiers.shift
                && ctx.manager.selection_mode() == SelectionMode::Multiple
            {
                ctx.manager.extend_selection(ctx.collection, &key);
            } else if select_on_focus {
                ctx.manager.replace_selection(ctx.collection, &key);
            }
        }
        self.focus_item(ctx, &key, true);
    }

    /// Home/End: extend on Ctrl+Shift in multi-select, else select on focus.
    fn jump(&self, ctx: &mut CollectionContext<'_>, event: &KeyEvent, key: Key) {
        ctx.manager.set_focused_key(Some(key.clone()));
        if self.platform.is_ctrl_key_pressed(event.modifiers)
            && event.modifiers.shift
            && ctx.manager.selection_mode() == SelectionMode::Multiple
        {
            ctx.manager.extend_selection(ctx.collection, &key);
        } else if self.select_on_focus(ctx.manager) {
            ctx.manager.replace_selection(ctx.collection, &key);
        }
        self.focus_item(ctx, &key, true);
    }

    /// Apply DOM side effects for the focused key: move real focus to the
    /// item's element (unless virtual focus) and optionally scroll it into
    /// view.
    fn focus_item(&self, ctx: &mut CollectionContext<'_>, key: &Key, scroll: bool) {
        if !self.options.virtual_focus
            && let Some(node) = ctx.doc.element_by_data_key(&key.to_string())
            && ctx.doc.contains(self.root, node)
        {
            ctx.doc.focus(node);
        }
        if scroll
            && let Some(layout) = ctx.layout
            && let Some(rect) = layout.item_rect(ctx.doc, key)
        {
            scroll_into_view(ctx.doc, self.root, rect);
        }
    }

    // =========================================================================
    // Focus entry and exit
    // =========================================================================

    /// Focus arrived somewhere inside the container.
    ///
    /// Picks an initial focused key when none exists: entering "from
    /// after" in document order lands on the last selected (or last) key,
    /// entering from before lands on the first selected (or first) key.
    pub fn handle_focus_in(
        &self,
        ctx: &mut CollectionContext<'_>,
        event: &FocusEvent,
        modality: Modality,
    ) {
        if ctx.manager.is_focused() {
            return;
        }
        if !ctx.doc.contains(self.root, event.target) {
            return;
        }
        ctx.manager.set_focused(true);

        if let Some(key) = ctx.manager.focused_key().cloned() {
            self.focus_item(ctx, &key, modality == Modality::Keyboard);
            return;
        }

        let from_after = event
            .related_target
            .is_some_and(|related| ctx.doc.is_before(self.root, related));
        let key = if from_after {
            ctx.manager
                .last_selected_key(ctx.collection)
                .or_else(|| ctx.delegate.last_key(ctx.doc))
        } else {
            ctx.manager
                .first_selected_key(ctx.collection)
                .or_else(|| ctx.delegate.first_key(ctx.doc))
        };
        let Some(key) = key else {
            return;
        };
        tracing::trace!(target: targets::SELECTION, %key, from_after, "collection focused");
        ctx.manager.set_focused_key(Some(key.clone()));
        if self.select_on_focus(ctx.manager) {
            ctx.manager.replace_selection(ctx.collection, &key);
        }
        self.focus_item(ctx, &key, modality == Modality::Keyboard);
    }

    /// Focus left the container entirely.
    pub fn handle_focus_out(&self, ctx: &mut CollectionContext<'_>, event: &FocusEvent) {
        let still_inside = event
            .related_target
            .is_some_and(|related| ctx.doc.contains(self.root, related));
        if !still_inside {
            ctx.manager.set_focused(false);
        }
    }
}
