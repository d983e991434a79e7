//! Core systems for Horizon Aria.
//!
//! This crate holds the foundations the behavior engine builds on:
//!
//! - [`Document`]: the retained element tree the engine navigates
//!   (arena-backed, shadow-root aware)
//! - [`Signal`]: direct-invocation change notifications
//! - [`Rect`]/[`Point`]/[`Size`]: the geometry layout delegates speak
//! - [`AriaError`]: eager configuration errors
//! - [`capability`]: process-wide runtime toggles
//! - [`logging`]: tracing target names for filtering
//!
//! The behavior layer itself (tree walking, focus scopes, keyboard
//! delegates, selection) lives in the `horizon-aria` crate.

pub mod capability;
pub mod document;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod signal;

pub use document::{Document, Element, ElementStyle, NodeId, NodeKind, Visibility};
pub use error::{AriaError, AriaResult};
pub use geometry::{Point, Rect, Size};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
