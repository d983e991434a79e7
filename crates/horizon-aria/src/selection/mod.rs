//! Selection state and the selectable-collection controller.

pub mod controller;
pub mod manager;
pub mod typeahead;

pub use controller::{
    CollectionContext, EscapeKeyBehavior, LinkBehavior, Router, SelectableCollection,
    SelectableCollectionOptions,
};
pub use manager::{
    DisabledBehavior, Selection, SelectionBehavior, SelectionManager, SelectionMode,
};
pub use typeahead::Typeahead;
