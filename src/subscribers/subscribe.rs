//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for hooking into queue lifecycle
//! events. Subscribers registered on a queue are dispatched **sequentially,
//! in registration order**, and the engine awaits the whole dispatch before
//! it acts — that is what makes the veto protocol work: a subscriber that
//! flips the cancel flag on a `Canceling` or `TaskFaulted` event is
//! guaranteed to be observed.
//!
//! ## Contract
//! - Dispatch is awaited by the engine; a slow subscriber delays the queue.
//!   Keep handlers short, or hand heavy work to the broadcast stream
//!   ([`TaskQueue::events`](crate::TaskQueue::events)) instead.
//! - Panics are isolated: a panicking subscriber is reported via a
//!   `SubscriberPanicked` event on the bus and does not poison the queue.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use sequeue::{EventKind, QueueEvent, Subscribe};
//!
//! struct VetoAll;
//!
//! #[async_trait]
//! impl Subscribe for VetoAll {
//!     async fn on_event(&self, ev: &QueueEvent) {
//!         if ev.kind == EventKind::Canceling {
//!             ev.set_cancel(false); // keep the item queued
//!         }
//!     }
//!     fn name(&self) -> &'static str {
//!         "veto-all"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::QueueEvent;

/// Contract for event subscribers.
///
/// Called inline from queue operations and the engine worker. Implementations
/// should avoid blocking the async runtime (prefer async I/O and cooperative
/// waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// The event's cancel flag (when present) may be flipped here; the
    /// engine reads it after every subscriber has run.
    async fn on_event(&self, event: &QueueEvent);

    /// Human-readable name (for panic reports).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
