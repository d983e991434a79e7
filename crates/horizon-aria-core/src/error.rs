//! Error types for Horizon Aria.

use thiserror::Error;

/// Errors that can occur while configuring or driving the behavior engine.
///
/// Expected absence ("no next key", "no matching element") is never an
/// error; those queries return `Option`. The variants here are programmer
/// errors that fail eagerly rather than degrading silently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AriaError {
    /// A tree walker's cursor was set to a node outside its root.
    #[error("node is not a descendant of the walker root")]
    NodeOutsideRoot,

    /// A grid keyboard delegate was constructed without a layout source.
    #[error("grid keyboard delegate requires a layout delegate or a container element")]
    MissingLayout,

    /// A node id does not name a live node in the document.
    #[error("node does not exist in the document")]
    DanglingNode,

    /// A shadow root was attached to a host that already has one.
    #[error("element already hosts a shadow root")]
    ShadowRootExists,
}

/// Result type for Horizon Aria operations.
pub type AriaResult<T> = Result<T, AriaError>;
