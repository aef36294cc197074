//! # Broadcast stream of queue events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] used for
//! passive observation: every event the queue raises is also published here,
//! fire-and-forget, after subscriber dispatch has completed.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits.
//! - **Bounded capacity**: one ring buffer of recent events shared by all
//!   receivers; slow receivers observe `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: events published with no active receivers are
//!   dropped.
//! - **No veto power**: the cancel flag on a streamed event has already
//!   been read by the engine by the time a receiver sees it. Use
//!   [`Subscribe`](crate::Subscribe) to participate in the veto protocol.

use tokio::sync::broadcast;

use super::event::QueueEvent;

/// Broadcast channel for queue events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender). Receivers get
/// clones of each event and only observe events sent after subscribing.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<QueueEvent>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<QueueEvent>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped and this still
    /// returns immediately.
    pub fn publish(&self, ev: QueueEvent) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new independent receiver for subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }
}
