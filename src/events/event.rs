//! # Lifecycle events raised by the queue and its engine.
//!
//! The [`EventKind`] enum classifies event types:
//! - **Queue events**: `Started`, `Stopped`, `Empty`
//! - **Work-item events**: `Scheduled`, `Canceling`, `Canceled`,
//!   `Executing`, `Executed`, `TaskFaulted`
//! - **Ambient**: `SubscriberPanicked` (bus only, never dispatched to
//!   subscribers)
//!
//! The [`QueueEvent`] struct carries optional metadata: the queue tag, the
//! work-item tag, an error message, and — for `Canceling` and `TaskFaulted`
//! — a shared mutable cancel flag that any subscriber may flip during
//! dispatch and that the engine reads afterwards.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events from the
//! broadcast stream are collected out of band.
//!
//! ## Example
//! ```rust
//! use sequeue::{EventKind, QueueEvent};
//!
//! let ev = QueueEvent::new(EventKind::TaskFaulted)
//!     .with_queue("downloads")
//!     .with_tag("item-1")
//!     .with_error("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFaulted);
//! assert_eq!(ev.tag.as_deref(), Some("item-1"));
//! assert_eq!(ev.error.as_deref(), Some("boom"));
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Work-item lifecycle events ===
    /// A work item was appended to the queue.
    ///
    /// Sets:
    /// - `tag`: work-item tag (if any)
    /// - `queue`: queue tag
    Scheduled,

    /// A queued work item is about to be descheduled.
    ///
    /// Sets:
    /// - `tag`: work-item tag (if any)
    /// - `queue`: queue tag
    /// - `cancel`: mutable flag, initially `true`; a subscriber that flips
    ///   it to `false` vetoes the deschedule and the item runs normally
    Canceling,

    /// A work item was removed without being executed (deschedule, clear,
    /// or fault-triggered abort of the remaining queue).
    ///
    /// Sets:
    /// - `tag`: work-item tag (if any)
    /// - `queue`: queue tag
    Canceled,

    /// A work item's action is about to be invoked.
    ///
    /// Sets:
    /// - `tag`: work-item tag (if any)
    /// - `queue`: queue tag
    Executing,

    /// A work item finished executing (whether or not it faulted).
    ///
    /// Sets:
    /// - `tag`: work-item tag (if any)
    /// - `queue`: queue tag
    Executed,

    /// A work item's action raised an error.
    ///
    /// Sets:
    /// - `tag`: work-item tag (if any)
    /// - `queue`: queue tag
    /// - `error`: the failure message
    /// - `cancel`: mutable flag defaulted to the queue's
    ///   `cancel_on_exception`; if it survives dispatch, every remaining
    ///   item is cancelled
    TaskFaulted,

    // === Queue lifecycle events ===
    /// The queue was started.
    ///
    /// Sets:
    /// - `queue`: queue tag
    Started,

    /// The queue was stopped; pending items are preserved.
    ///
    /// Sets:
    /// - `queue`: queue tag
    Stopped,

    /// The engine drained the last work item; the collection is empty.
    ///
    /// Sets:
    /// - `queue`: queue tag
    Empty,

    // === Ambient ===
    /// A subscriber panicked while handling an event. Published to the
    /// broadcast stream only; never re-enters subscriber dispatch.
    ///
    /// Sets:
    /// - `tag`: subscriber name
    /// - `error`: panic message
    SubscriberPanicked,
}

/// Queue event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct QueueEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Tag of the queue that raised the event.
    pub queue: Option<Arc<str>>,
    /// Tag of the work item, if applicable.
    pub tag: Option<Arc<str>>,
    /// Human-readable error message (faults, panic info).
    pub error: Option<Arc<str>>,

    /// Shared cancel flag for `Canceling` / `TaskFaulted`.
    ///
    /// The engine and every subscriber see the same [`AtomicBool`]; the
    /// engine reads it after dispatch completes.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl QueueEvent {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            queue: None,
            tag: None,
            error: None,
            cancel: None,
        }
    }

    /// Attaches the queue tag.
    #[inline]
    pub fn with_queue(mut self, queue: impl Into<Arc<str>>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Attaches a work-item tag.
    #[inline]
    pub fn with_tag(mut self, tag: impl Into<Arc<str>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attaches a work-item tag if one is present.
    #[inline]
    pub fn with_tag_opt(mut self, tag: Option<Arc<str>>) -> Self {
        self.tag = tag;
        self
    }

    /// Attaches an error message.
    #[inline]
    pub fn with_error(mut self, error: impl Into<Arc<str>>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attaches a shared cancel flag.
    #[inline]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Sets the cancel flag, if this event carries one.
    ///
    /// Intended for subscribers handling `Canceling` (veto with `false`)
    /// or `TaskFaulted` (opt out of cancel-on-exception with `false`).
    #[inline]
    pub fn set_cancel(&self, value: bool) {
        if let Some(flag) = &self.cancel {
            flag.store(value, AtomicOrdering::SeqCst);
        }
    }

    /// Reads the cancel flag; `false` when the event carries none.
    #[inline]
    pub fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|f| f.load(AtomicOrdering::SeqCst))
            .unwrap_or(false)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        QueueEvent::new(EventKind::SubscriberPanicked)
            .with_tag(subscriber)
            .with_error(info)
    }
}
