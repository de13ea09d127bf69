//! Notification signals for the tree/list control.
//!
//! A trimmed-down relative of the framework's signal/slot system: slots are
//! always invoked directly, on the emitting thread, in connection order, and
//! each slot can ask the emitter to suppress its default handling.
//!
//! # Example
//!
//! ```
//! use horizon_treelist::signal::{Propagation, Signal};
//!
//! let signal = Signal::<i32>::new();
//! let id = signal.connect(|value| {
//!     if *value < 0 {
//!         Propagation::Suppress
//!     } else {
//!         Propagation::Continue
//!     }
//! });
//!
//! assert_eq!(signal.emit(1), Propagation::Continue);
//! assert_eq!(signal.emit(-1), Propagation::Suppress);
//! signal.disconnect(id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

/// What a slot wants the emitter to do after it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Keep the default handling.
    #[default]
    Continue,
    /// Veto the default (visual) handling of the notification.
    Suppress,
}

impl Propagation {
    /// Returns `true` if this is [`Propagation::Suppress`].
    pub fn is_suppressed(self) -> bool {
        self == Propagation::Suppress
    }
}

type Slot<Args> = Arc<dyn Fn(&Args) -> Propagation + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// Emission is synchronous: every slot has returned before [`emit`](Self::emit)
/// does. Slots must not connect to or disconnect from the signal they are
/// being invoked by.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot that may veto default handling.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) -> Propagation + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Connect a slot that only observes.
    pub fn observe<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect(move |args| {
            slot(args);
            Propagation::Continue
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, `emit()` invokes nothing and reports `Continue`.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// Every slot runs even if an earlier one suppressed; the result is
    /// `Suppress` if any slot asked for it.
    #[tracing::instrument(skip_all, target = "horizon_treelist::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> Propagation {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return Propagation::Continue;
        }

        // Snapshot the slots so the lock is not held while user code runs.
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        let mut result = Propagation::Continue;
        for slot in slots {
            if slot(&args).is_suppressed() {
                result = Propagation::Suppress;
            }
        }
        result
    }
}
