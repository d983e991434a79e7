//! Input event types consumed by the behavior engine.
//!
//! The host framework translates platform input into these events and
//! feeds them to focus scopes and selectable collections. Events carry an
//! [`EventBase`] with the usual browser-style flags: `prevent_default`
//! stops the host's default action, `stop_propagation` stops later
//! handlers in a [`HandlerChain`].

use horizon_aria_core::NodeId;

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held (Windows key, Cmd on macOS).
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
        meta: false,
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        shift: false,
        control: true,
        alt: false,
        meta: false,
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        shift: false,
        control: false,
        alt: true,
        meta: false,
    };

    /// Control + Shift modifiers.
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }

    /// Check if no modifiers are pressed.
    pub fn none(&self) -> bool {
        !self.any()
    }
}

/// The keys the engine reacts to.
///
/// Printable input arrives as `Character`; everything else the engine
/// cares about is named. Hosts may map additional platform keys to
/// `Character` or simply not forward them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    Enter,
    Escape,
    Space,
    /// A printable character (lowercased by the host where applicable).
    Character(char),
}

/// How the user is currently driving the interface.
///
/// Some side effects are modality-gated: scrolling the focused item into
/// view happens for keyboard interaction, not for pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modality {
    #[default]
    Keyboard,
    Pointer,
    /// Driven by assistive technology (virtual cursor).
    Virtual,
}

/// The platform the engine is running on, for modifier conventions.
///
/// The non-contiguous-selection modifier is Option on Apple platforms and
/// Ctrl elsewhere; Ctrl+A vs Cmd+A follows the same split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    /// The platform the crate was compiled for.
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    /// Whether the primary command modifier (Cmd/Ctrl) is held.
    pub fn is_ctrl_key_pressed(&self, modifiers: Modifiers) -> bool {
        match self {
            Platform::Mac => modifiers.meta,
            Platform::Other => modifiers.control,
        }
    }

    /// Whether the non-contiguous-selection modifier is held
    /// (Option on Apple platforms, Ctrl elsewhere).
    pub fn is_non_contiguous_modifier(&self, modifiers: Modifiers) -> bool {
        match self {
            Platform::Mac => modifiers.alt,
            Platform::Other => modifiers.control,
        }
    }
}

/// Common data for all engine events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBase {
    default_prevented: bool,
    propagation_stopped: bool,
}

impl EventBase {
    /// Create a fresh event base with no flags set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the host's default action for this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the default action was suppressed.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop later handlers in the chain from seeing this event.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether propagation was stopped.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// A key press delivered to the engine.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Base event flags.
    pub base: EventBase,
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers held during the press.
    pub modifiers: Modifiers,
    /// The element the event targets (the focused element).
    pub target: Option<NodeId>,
}

impl KeyEvent {
    /// Create a key event with no target.
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            base: EventBase::new(),
            code,
            modifiers,
            target: None,
        }
    }

    /// Create a key event targeting a specific element.
    pub fn with_target(code: KeyCode, modifiers: Modifiers, target: NodeId) -> Self {
        Self {
            base: EventBase::new(),
            code,
            modifiers,
            target: Some(target),
        }
    }
}

/// A focus transition delivered to the engine.
///
/// For focus-in, `target` gains focus and `related_target` is the element
/// losing it; for focus-out the roles reverse.
#[derive(Debug, Clone)]
pub struct FocusEvent {
    /// Base event flags.
    pub base: EventBase,
    /// The element gaining (focus-in) or losing (focus-out) focus.
    pub target: NodeId,
    /// The other side of the transition, if any.
    pub related_target: Option<NodeId>,
}

impl FocusEvent {
    /// Create a focus event.
    pub fn new(target: NodeId, related_target: Option<NodeId>) -> Self {
        Self {
            base: EventBase::new(),
            target,
            related_target,
        }
    }
}

/// An ordered list of handlers composed into one.
///
/// Handlers run in push order. A handler that calls
/// [`EventBase::stop_propagation`] on the event prevents later handlers
/// from running; `prevent_default` does not affect other handlers. This is
/// the explicit composition seam for merging independent behaviors (e.g.
/// navigation and typeahead) over the same keystroke.
pub struct HandlerChain<E> {
    handlers: Vec<Box<dyn FnMut(&mut E)>>,
}

impl<E: ChainedEvent> Default for HandlerChain<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for HandlerChain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

pub trait ChainedEvent {
    /// Access to the event's base flags.
    fn base(&self) -> &EventBase;
}

impl ChainedEvent for KeyEvent {
    fn base(&self) -> &EventBase {
        &self.base
    }
}

impl ChainedEvent for FocusEvent {
    fn base(&self) -> &EventBase {
        &self.base
    }
}

impl<E: ChainedEvent> HandlerChain<E> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler to the chain.
    pub fn push<F>(&mut self, handler: F)
    where
        F: FnMut(&mut E) + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Dispatch an event through the chain in order.
    pub fn dispatch(&mut self, event: &mut E) {
        for handler in &mut self.handlers {
            if event.base().propagation_stopped() {
                break;
            }
            handler(event);
        }
    }
}
