//! Focus movement and containment.

pub mod manager;
pub mod scope;

pub use manager::{FocusManager, FocusOptions};
pub use scope::{FocusScopes, RestoreFocusEvent, ScopeId, ScopeOptions};
