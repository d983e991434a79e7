//! Process-wide runtime capability flags.
//!
//! Hosts that never render into shadow roots can leave shadow-DOM support
//! disabled; every shadow-aware component then degrades to a plain
//! document-order walk with no shadow bookkeeping. The flag is consulted at
//! call time, so flipping it affects walkers created afterwards.

use std::sync::atomic::{AtomicBool, Ordering};

static SHADOW_DOM_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable or disable shadow-DOM-aware traversal process-wide.
pub fn set_shadow_dom_enabled(enabled: bool) {
    SHADOW_DOM_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether shadow-DOM-aware traversal is enabled.
#[inline]
pub fn shadow_dom_enabled() -> bool {
    SHADOW_DOM_ENABLED.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        set_shadow_dom_enabled(true);
        assert!(shadow_dom_enabled());
        set_shadow_dom_enabled(false);
        assert!(!shadow_dom_enabled());
    }
}
