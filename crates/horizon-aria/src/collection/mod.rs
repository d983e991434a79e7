//! Ordered, read-only item collections.
//!
//! A collection is an immutable snapshot of the items a widget shows.
//! The engine only ever reads it: a data change produces a fresh snapshot
//! rather than mutating the old one, so navigation logic never observes a
//! half-updated sequence.

pub mod grid;
pub mod key;
pub mod list;
pub mod node;
pub mod traits;

pub use grid::GridCollection;
pub use key::Key;
pub use list::ListCollection;
pub use node::{CollectionNode, NodeVariant};
pub use traits::Collection;
