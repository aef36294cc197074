//! # Run state: one generation of a queue's execution context.
//!
//! [`RunState`] bundles the lifecycle flags, the cancellation token, and a
//! snapshot of the queue's configuration. Two pieces are shared with the
//! facade and carried across generations: the [`TaskCollection`] (so
//! pending items survive a stop/restart cycle) and the [`ExecSlot`] (so
//! in-flight execution attribution survives it too — a restart landing
//! while the previous generation's action is still suspended must not
//! start a second execution of the same head).
//!
//! ## Lifecycle
//! ```text
//! (lazily created on first schedule/start)
//!     │
//!     ▼
//! NotStarted ──start()──► Started ──stop()──► Stopped + invalid
//!                                                 │
//!                       fresh RunState ◄──start()─┘
//!                       (same collection + exec slot, new token)
//! ```
//!
//! ## Rules
//! - `is_busy` is the reentrancy guard: true for the entire span between
//!   "about to execute" and "finished dequeuing", including suspension
//!   inside the action. At most one item carries the attribution at a time,
//!   across all generations of one queue.
//! - An invalidated state is never reused; the facade constructs a
//!   replacement before further scheduling or starting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::config::QueueConfig;
use crate::core::TaskCollection;
use crate::tasks::WorkRef;

/// In-flight execution attribution, shared by every generation of one
/// queue: the busy flag, the `current` slot, and the worker wakeup handle.
pub(crate) struct ExecSlot {
    busy: AtomicBool,
    current: Mutex<Option<WorkRef>>,
    notify: Notify,
}

impl ExecSlot {
    pub(crate) fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            current: Mutex::new(None),
            notify: Notify::new(),
        }
    }
}

/// Mutable execution context for one started/stopped generation of a queue.
pub(crate) struct RunState {
    /// Shared FIFO of pending items; survives generations.
    pub(crate) collection: Arc<Mutex<TaskCollection>>,
    /// Cancellation handle for this generation; signalled by `stop()`.
    pub(crate) token: CancellationToken,
    /// Configuration snapshot taken when this generation was built.
    pub(crate) config: QueueConfig,

    exec: Arc<ExecSlot>,

    is_started: AtomicBool,
    is_running: AtomicBool,
    is_stopped: AtomicBool,
    invalid: AtomicBool,
}

impl RunState {
    /// Creates a fresh generation over the given (shared) collection and
    /// execution slot.
    pub(crate) fn new(
        collection: Arc<Mutex<TaskCollection>>,
        exec: Arc<ExecSlot>,
        config: QueueConfig,
    ) -> Self {
        Self {
            collection,
            token: CancellationToken::new(),
            config,
            exec,
            is_started: AtomicBool::new(false),
            is_running: AtomicBool::new(false),
            is_stopped: AtomicBool::new(false),
            invalid: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_started(&self) -> bool {
        self.is_started.load(Ordering::SeqCst)
    }

    pub(crate) fn set_started(&self, value: bool) {
        self.is_started.store(value, Ordering::SeqCst);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, value: bool) {
        self.is_running.store(value, Ordering::SeqCst);
    }

    /// Shared across generations: `true` while any generation's action is
    /// attributed as executing.
    pub(crate) fn is_busy(&self) -> bool {
        self.exec.busy.load(Ordering::SeqCst)
    }

    pub(crate) fn set_busy(&self, value: bool) {
        self.exec.busy.store(value, Ordering::SeqCst);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.is_stopped.load(Ordering::SeqCst)
    }

    pub(crate) fn set_stopped(&self, value: bool) {
        self.is_stopped.store(value, Ordering::SeqCst);
    }

    /// Marks this generation unusable; the facade must construct a
    /// replacement before further scheduling/starting.
    pub(crate) fn invalidate(&self) {
        self.invalid.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_invalid(&self) -> bool {
        self.invalid.load(Ordering::SeqCst)
    }

    /// Wakeup handle for the engine worker; shared across generations so a
    /// retiring worker can hand off to its successor.
    pub(crate) fn notify(&self) -> &Notify {
        &self.exec.notify
    }

    /// Records the item whose action is about to run.
    pub(crate) fn set_current(&self, item: Option<WorkRef>) {
        *self.exec.current.lock().unwrap() = item;
    }

    /// Returns the actively executing item, if any.
    pub(crate) fn current(&self) -> Option<WorkRef> {
        self.exec.current.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RunState {
        RunState::new(
            Arc::new(Mutex::new(TaskCollection::new())),
            Arc::new(ExecSlot::new()),
            QueueConfig::default(),
        )
    }

    #[test]
    fn fresh_state_is_idle() {
        let s = state();
        assert!(!s.is_started());
        assert!(!s.is_running());
        assert!(!s.is_busy());
        assert!(!s.is_stopped());
        assert!(!s.is_invalid());
        assert!(s.current().is_none());
    }

    #[test]
    fn invalidation_is_sticky() {
        let s = state();
        s.invalidate();
        assert!(s.is_invalid());
    }

    #[test]
    fn busy_attribution_is_shared_across_generations() {
        let collection = Arc::new(Mutex::new(TaskCollection::new()));
        let exec = Arc::new(ExecSlot::new());
        let old = RunState::new(collection.clone(), exec.clone(), QueueConfig::default());
        let fresh = RunState::new(collection, exec, QueueConfig::default());

        old.set_busy(true);
        assert!(fresh.is_busy());
        old.set_busy(false);
        assert!(!fresh.is_busy());
    }
}
