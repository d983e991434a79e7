//! Signal/slot notifications for Horizon Aria.
//!
//! A type-safe signal mechanism for state-change notifications: selection
//! managers emit when selection or the focused key changes, and hosts
//! connect slots (callbacks) to drive re-rendering.
//!
//! This engine is synchronous and single-threaded by design (every
//! navigation completes within the input event that triggered it), so all
//! connections are direct: slots run immediately on the emitting call, in
//! connection order. There is no queued or cross-thread delivery.
//!
//! # Example
//!
//! ```
//! use horizon_aria_core::Signal;
//!
//! let changed = Signal::<String>::new();
//! let id = changed.connect(|text| {
//!     println!("changed to {text}");
//! });
//! changed.emit("hello".to_string());
//! changed.disconnect(id);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`], or hold a [`ConnectionGuard`] instead for
    /// RAII disconnection.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<Mutex<dyn FnMut(Args) + Send>>;

/// A signal that notifies connected slots when emitted.
///
/// `Signal` is a shared handle: cloning it produces another handle to the
/// same connection list. Slots receive the emitted arguments by value, so
/// `Args` must be `Clone` to emit to more than one slot.
pub struct Signal<Args> {
    connections: Arc<Mutex<SlotMap<ConnectionId, Slot<Args>>>>,
}

impl<Args> Clone for Signal<Args> {
    fn clone(&self) -> Self {
        Self {
            connections: Arc::clone(&self.connections),
        }
    }
}

impl<Args: Clone + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().len())
            .finish()
    }
}

impl<Args: Clone + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
        }
    }

    /// Connect a slot to this signal.
    ///
    /// The slot is invoked on every subsequent [`emit`](Self::emit) until
    /// disconnected. Returns a [`ConnectionId`] for later disconnection.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: FnMut(Args) + Send + 'static,
    {
        self.connections.lock().insert(Arc::new(Mutex::new(slot)))
    }

    /// Connect a slot, returning a guard that disconnects when dropped.
    pub fn connect_guarded<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: FnMut(Args) + Send + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: self.clone(),
            id,
        }
    }

    /// Disconnect a previously connected slot.
    ///
    /// Returns `true` if the connection existed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect every connected slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Emit the signal, invoking every connected slot in connection order.
    ///
    /// Slots may connect or disconnect other slots while running; the set
    /// of slots invoked is the one captured at the start of the emit.
    pub fn emit(&self, args: Args) {
        // Snapshot the slots so a slot can mutate the connection list
        // without deadlocking.
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        for slot in slots {
            (slot.lock())(args.clone());
        }
    }
}

/// RAII guard that disconnects a signal connection when dropped.
pub struct ConnectionGuard<Args> {
    signal: Signal<Args>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// The identifier of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        self.signal.connections.lock().remove(self.id);
    }
}
