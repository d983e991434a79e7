//! Logging facilities for Horizon Aria.
//!
//! Horizon Aria uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! Navigation and focus handling run on the input hot path, so the engine
//! logs at `debug`/`trace` only; there are no `info`-level logs.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem, e.g.
/// `RUST_LOG=horizon_aria::focus=trace`.
pub mod targets {
    /// Document tree mutation and focus state.
    pub const DOCUMENT: &str = "horizon_aria::document";
    /// Tree walker traversal.
    pub const WALKER: &str = "horizon_aria::walker";
    /// Focus scope mount/unmount, containment, and restoration.
    pub const SCOPE: &str = "horizon_aria::scope";
    /// Focus manager queries.
    pub const FOCUS: &str = "horizon_aria::focus";
    /// Keyboard delegate queries.
    pub const DELEGATE: &str = "horizon_aria::delegate";
    /// Selection state changes and controller dispatch.
    pub const SELECTION: &str = "horizon_aria::selection";
}
