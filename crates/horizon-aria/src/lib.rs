//! Framework-agnostic accessible-component behavior.
//!
//! Horizon Aria supplies the *behavior* behind accessible widgets —
//! keyboard navigation, selection state, focus containment, ARIA
//! attribute wiring — leaving rendering to the component layer. The
//! engine operates on the retained [`Document`](horizon_aria_core::Document)
//! tree from `horizon-aria-core`.
//!
//! The pieces, leaves first:
//!
//! - [`dom`]: a shadow-root-aware tree walker and the focusable/tabbable
//!   predicates that filter it
//! - [`focus`]: programmatic focus movement and the focus-scope state
//!   machine (containment, auto focus, restoration)
//! - [`collection`]: immutable ordered snapshots of list and grid items
//! - [`layout`]: geometry sources backing 2-D navigation and paging
//! - [`delegate`]: pure queries mapping "focused key + direction" to the
//!   next key
//! - [`selection`]: selection state, typeahead, and the controller tying
//!   key and focus events to the delegates
//! - [`props`]: the ARIA/roving-tabindex attribute maps handed to the
//!   component layer
//!
//! # Example
//!
//! ```
//! use horizon_aria::collection::{CollectionNode, ListCollection};
//! use horizon_aria::delegate::ListKeyboardDelegate;
//! use horizon_aria::event::{KeyCode, KeyEvent, Modifiers};
//! use horizon_aria::selection::{CollectionContext, SelectableCollection, SelectionManager};
//! use horizon_aria_core::Document;
//!
//! let mut doc = Document::new();
//! let list_el = doc.create_child(doc.root(), "ul");
//!
//! let collection: ListCollection = [("a", "Alpha"), ("b", "Bravo")]
//!     .into_iter()
//!     .map(|(key, text)| CollectionNode::item(key, text))
//!     .collect();
//! let delegate = ListKeyboardDelegate::new(&collection);
//! let mut manager = SelectionManager::new();
//! let mut controller = SelectableCollection::new(list_el);
//!
//! let mut ctx = CollectionContext {
//!     doc: &mut doc,
//!     collection: &collection,
//!     delegate: &delegate,
//!     manager: &mut manager,
//!     layout: None,
//!     router: None,
//! };
//! let mut down = KeyEvent::new(KeyCode::ArrowDown, Modifiers::NONE);
//! controller.handle_key_down(&mut ctx, &mut down);
//! assert_eq!(manager.focused_key().map(ToString::to_string), Some("a".into()));
//! ```

pub mod collection;
pub mod delegate;
pub mod dom;
pub mod event;
pub mod focus;
pub mod layout;
pub mod props;
pub mod selection;

pub use collection::{Collection, CollectionNode, GridCollection, Key, ListCollection};
pub use delegate::{
    Direction, FocusMode, GridKeyboardDelegate, KeyboardDelegate, ListKeyboardDelegate,
    Orientation,
};
pub use dom::{is_focusable, is_tabbable, ElementWalker};
pub use focus::{FocusManager, FocusOptions, FocusScopes, ScopeOptions};
pub use layout::{CachedLayoutDelegate, DomLayoutDelegate, LayoutDelegate};
pub use selection::{SelectableCollection, SelectionManager, SelectionMode};
