//! # Queue facade: the public surface of one sequential queue.
//!
//! [`TaskQueue`] owns the shared work collection, the current run-state
//! generation, the subscriber set, and the broadcast bus. Operations return
//! `&Self` (or `Result<&Self>`) so calls chain.
//!
//! ```rust,no_run
//! use sequeue::{TaskContext, TaskFn, TaskQueue};
//!
//! # async fn demo() -> Result<(), sequeue::QueueError> {
//! let queue = TaskQueue::new();
//! queue
//!     .schedule_tagged("greet", TaskFn::arc(|_ctx: TaskContext| async {
//!         println!("hello");
//!         Ok(())
//!     }))
//!     .await
//!     .start()
//!     .await?;
//! queue.wait_empty().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Rules
//! - Stop invalidates the current generation; the next start builds a fresh
//!   one over the same collection, so pending items survive a stop/restart
//!   cycle without being re-announced as `Scheduled`.
//! - Config setters succeed only while not started and take effect on the
//!   next generation.
//! - Event raising is two-phase: registered subscribers are dispatched and
//!   awaited first (they can flip cancel flags), then the event is published
//!   to the passive broadcast stream.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;

use crate::config::QueueConfig;
use crate::core::engine::{self, Engine};
use crate::core::{ExecSlot, RunState, TaskCollection};
use crate::error::QueueError;
use crate::events::{Bus, EventKind, QueueEvent};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::{TaskRef, WorkItem, WorkRef};

struct Inner {
    tag: Option<Arc<str>>,
    /// Opaque caller payload attached at creation.
    data: Option<Arc<dyn Any + Send + Sync>>,
    collection: Arc<Mutex<TaskCollection>>,
    /// Execution attribution shared by all run-state generations.
    exec: Arc<ExecSlot>,
    /// Current run-state generation. Replaced (never mutated in place) on
    /// restart and on config changes while not started.
    state: Mutex<Arc<RunState>>,
    config: Mutex<QueueConfig>,
    bus: Bus,
    subs: SubscriberSet,
}

/// Sequential task queue: one item at a time, in submission order.
///
/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

impl TaskQueue {
    /// Creates an untagged queue with default configuration.
    pub fn new() -> Self {
        Self::build(None, QueueConfig::default(), None)
    }

    /// Creates an untagged queue with the given configuration.
    pub fn with_config(config: QueueConfig) -> Self {
        Self::build(None, config, None)
    }

    /// Creates a tagged queue with default configuration.
    ///
    /// The tag identifies the queue in events and registry lookups.
    pub fn tagged(tag: impl Into<Arc<str>>) -> Self {
        Self::build(Some(tag.into()), QueueConfig::default(), None)
    }

    pub(crate) fn build(
        tag: Option<Arc<str>>,
        config: QueueConfig,
        data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Self {
        let collection = Arc::new(Mutex::new(TaskCollection::new()));
        let exec = Arc::new(ExecSlot::new());
        let state = Arc::new(RunState::new(
            collection.clone(),
            exec.clone(),
            config.clone(),
        ));
        let bus = Bus::new(config.bus_capacity_clamped());
        Self {
            inner: Arc::new(Inner {
                tag,
                data,
                collection,
                exec,
                state: Mutex::new(state),
                config: Mutex::new(config),
                bus: bus.clone(),
                subs: SubscriberSet::new(bus),
            }),
        }
    }

    /// Returns the queue's tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.inner.tag.as_deref()
    }

    /// Returns the opaque payload attached at creation, if any.
    ///
    /// Set via
    /// [`QueueRegistry::create_with_data`](crate::QueueRegistry::create_with_data).
    pub fn data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.inner.data.clone()
    }

    /// Typed view of the payload; `None` when absent or of another type.
    pub fn data_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.inner.data.clone().and_then(|d| d.downcast::<T>().ok())
    }

    // === Scheduling ===

    /// Enqueues an untagged work item.
    pub async fn schedule(&self, task: TaskRef) -> &Self {
        self.schedule_item(WorkItem::new(task)).await
    }

    /// Enqueues a tagged work item.
    ///
    /// Tags are free-form and not required to be unique.
    pub async fn schedule_tagged(&self, tag: impl Into<Arc<str>>, task: TaskRef) -> &Self {
        self.schedule_item(WorkItem::tagged(tag, task)).await
    }

    /// Enqueues a pre-built work item. Keeping the returned handle allows
    /// identity-based descheduling later.
    ///
    /// Safe to call while another item is executing: the append is
    /// immediate and the in-flight pass picks the new item up itself.
    pub async fn schedule_item(&self, item: WorkRef) -> &Self {
        self.inner.collection.lock().unwrap().enqueue(item.clone());
        self.raise(
            self.event(EventKind::Scheduled)
                .with_tag_opt(item.tag_arc()),
        )
        .await;
        engine::advance(&self.state());
        self
    }

    // === Lifecycle ===

    /// Starts the queue: spawns the engine worker and begins draining.
    ///
    /// Fails with [`QueueError::AlreadyStarted`] if already started. After a
    /// stop, builds a fresh generation over the preserved collection.
    pub async fn start(&self) -> Result<&Self, QueueError> {
        let state = {
            let mut guard = self.inner.state.lock().unwrap();
            if guard.is_started() {
                return Err(QueueError::AlreadyStarted);
            }
            if guard.is_invalid() {
                *guard = self.fresh_state();
            }
            guard.clone()
        };

        state.set_started(true);
        state.set_stopped(false);
        tokio::spawn(Engine::new(self.clone(), state.clone()).run());

        self.raise(self.event(EventKind::Started)).await;
        engine::advance(&state);
        Ok(self)
    }

    /// Stops the queue: signals cancellation and invalidates the current
    /// generation. Pending items stay queued for the next start.
    ///
    /// Fails with [`QueueError::NotStarted`] if not started. Cancellation is
    /// advisory: an action already in flight is not interrupted, but no
    /// further item is dequeued.
    pub async fn stop(&self) -> Result<&Self, QueueError> {
        let state = self.state();
        if !state.is_started() {
            return Err(QueueError::NotStarted);
        }

        state.set_started(false);
        state.set_stopped(true);
        state.set_running(false);
        // The busy flag is left to the in-flight execution's own unwind:
        // it is shared across generations, and clearing it here would let a
        // restarted queue run the suspended head a second time.
        state.token.cancel();
        state.invalidate();

        self.raise(self.event(EventKind::Stopped)).await;
        Ok(self)
    }

    // === Cancellation ===

    /// Deschedules the first queued (not-yet-run) item with the given tag,
    /// subject to subscriber veto via the `Canceling` event's cancel flag.
    ///
    /// Fails with [`QueueError::UnknownTag`] when no queued item matches,
    /// and with [`QueueError::NotInQueue`] when the match is the item
    /// currently executing.
    pub async fn deschedule(&self, tag: &str) -> Result<&Self, QueueError> {
        let found = {
            let coll = self.inner.collection.lock().unwrap();
            let found = coll.iter().find(|i| i.tag() == Some(tag)).cloned();
            found
        };
        let item = found.ok_or_else(|| QueueError::UnknownTag {
            tag: tag.to_string(),
        })?;
        self.reject_current(&item)?;
        self.cancel_queued(item).await
    }

    /// Deschedules one specific item by identity, subject to subscriber
    /// veto. Use this instead of [`deschedule`](Self::deschedule) when tags
    /// are not unique.
    ///
    /// Fails with [`QueueError::NotInQueue`] when the item is absent or
    /// currently executing.
    pub async fn deschedule_item(&self, item: &WorkRef) -> Result<&Self, QueueError> {
        if !self.inner.collection.lock().unwrap().contains(item) {
            return Err(QueueError::NotInQueue);
        }
        self.reject_current(item)?;
        self.cancel_queued(item.clone()).await
    }

    /// Removes every pending item, raising `Canceled` for each in order.
    ///
    /// Fails with [`QueueError::Busy`] while an item is executing.
    pub async fn clear(&self) -> Result<&Self, QueueError> {
        if self.state().is_busy() {
            return Err(QueueError::Busy);
        }
        let drained = self.inner.collection.lock().unwrap().drain_all();
        for item in drained {
            self.raise(
                self.event(EventKind::Canceled)
                    .with_tag_opt(item.tag_arc()),
            )
            .await;
        }
        Ok(self)
    }

    fn reject_current(&self, item: &WorkRef) -> Result<(), QueueError> {
        match self.state().current() {
            Some(cur) if Arc::ptr_eq(&cur, item) => Err(QueueError::NotInQueue),
            _ => Ok(()),
        }
    }

    /// Canceling → (veto?) → remove → Canceled.
    async fn cancel_queued(&self, item: WorkRef) -> Result<&Self, QueueError> {
        let flag = Arc::new(AtomicBool::new(true));
        self.raise(
            self.event(EventKind::Canceling)
                .with_tag_opt(item.tag_arc())
                .with_cancel_flag(flag.clone()),
        )
        .await;

        if !flag.load(Ordering::SeqCst) {
            // Vetoed: the item stays queued and runs normally later.
            return Ok(self);
        }

        if !self.inner.collection.lock().unwrap().remove(&item) {
            return Err(QueueError::NotInQueue);
        }
        self.raise(
            self.event(EventKind::Canceled)
                .with_tag_opt(item.tag_arc()),
        )
        .await;
        Ok(self)
    }

    // === Accessors ===

    /// Number of pending items, including one currently executing.
    pub fn count(&self) -> usize {
        self.inner.collection.lock().unwrap().len()
    }

    /// Returns `true` when no item is pending.
    pub fn is_empty(&self) -> bool {
        self.inner.collection.lock().unwrap().is_empty()
    }

    /// Returns `true` between `start()` and `stop()`.
    pub fn is_started(&self) -> bool {
        self.state().is_started()
    }

    /// Returns `true` while the engine is making progress.
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Returns `true` while a work item's action is attributed as
    /// executing.
    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Returns `true` after `stop()` until the next `start()`.
    pub fn is_stopped(&self) -> bool {
        self.state().is_stopped()
    }

    /// Returns the item whose action is actively executing, if any.
    pub fn current(&self) -> Option<WorkRef> {
        self.state().current()
    }

    // === Configuration ===

    /// Fixed delay applied before each item.
    pub fn delay(&self) -> Duration {
        self.inner.config.lock().unwrap().delay
    }

    /// Sets the inter-item delay. Fails with
    /// [`QueueError::InvalidWhileRunning`] while the queue is started.
    pub fn set_delay(&self, delay: Duration) -> Result<&Self, QueueError> {
        self.reconfigure(|config| config.delay = delay)
    }

    /// Whether a faulting item aborts the remainder of the queue by
    /// default.
    pub fn cancel_on_exception(&self) -> bool {
        self.inner.config.lock().unwrap().cancel_on_exception
    }

    /// Sets the cancel-on-exception policy. Fails with
    /// [`QueueError::InvalidWhileRunning`] while the queue is started.
    pub fn set_cancel_on_exception(&self, value: bool) -> Result<&Self, QueueError> {
        self.reconfigure(|config| config.cancel_on_exception = value)
    }

    /// Applies a config change and swaps in a fresh (not-started) run state
    /// carrying the new snapshot.
    fn reconfigure(&self, apply: impl FnOnce(&mut QueueConfig)) -> Result<&Self, QueueError> {
        let mut guard = self.inner.state.lock().unwrap();
        if guard.is_started() {
            return Err(QueueError::InvalidWhileRunning);
        }
        apply(&mut self.inner.config.lock().unwrap());
        *guard = self.fresh_state();
        Ok(self)
    }

    // === Events ===

    /// Registers a subscriber; it participates in ordered, awaited dispatch
    /// and may flip cancel flags.
    pub async fn subscribe(&self, sub: Arc<dyn Subscribe>) -> &Self {
        self.inner.subs.add(sub).await;
        self
    }

    /// Returns a passive receiver for the broadcast event stream.
    ///
    /// Only events raised after this call are observed; slow receivers may
    /// lag and skip older events.
    pub fn events(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.bus.subscribe()
    }

    /// Resolves once the queue has drained.
    ///
    /// Returns immediately when nothing is pending or executing; otherwise
    /// waits for the next `Empty` event.
    pub async fn wait_empty(&self) {
        let mut rx = self.inner.bus.subscribe();
        if self.is_empty() && !self.is_busy() {
            return;
        }
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == EventKind::Empty => return,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if self.is_empty() && !self.is_busy() {
                        return;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    }

    /// Dispatches to registered subscribers (awaited, in order), then
    /// publishes to the broadcast stream.
    pub(crate) async fn raise(&self, event: QueueEvent) {
        self.inner.subs.dispatch(&event).await;
        self.inner.bus.publish(event);
    }

    /// Builds an event pre-stamped with this queue's tag.
    pub(crate) fn event(&self, kind: EventKind) -> QueueEvent {
        let mut ev = QueueEvent::new(kind);
        ev.queue = self.inner.tag.clone();
        ev
    }

    fn state(&self) -> Arc<RunState> {
        self.inner.state.lock().unwrap().clone()
    }

    fn fresh_state(&self) -> Arc<RunState> {
        let config = self.inner.config.lock().unwrap();
        Arc::new(RunState::new(
            self.inner.collection.clone(),
            self.inner.exec.clone(),
            config.clone(),
        ))
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity equality: two handles are equal when they refer to the same
/// queue.
impl PartialEq for TaskQueue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for TaskQueue {}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("tag", &self.inner.tag)
            .field("count", &self.count())
            .field("is_started", &self.is_started())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskContext, TaskFn};

    fn noop() -> TaskRef {
        TaskFn::arc(|_ctx: TaskContext| async { Ok(()) })
    }

    #[tokio::test]
    async fn schedule_before_start_only_queues() {
        let queue = TaskQueue::new();
        queue.schedule_tagged("a", noop()).await;
        queue.schedule_tagged("b", noop()).await;

        assert_eq!(queue.count(), 2);
        assert!(!queue.is_started());
        assert!(!queue.is_busy());
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let queue = TaskQueue::new();
        queue.start().await.unwrap();
        assert!(matches!(
            queue.start().await,
            Err(QueueError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn stop_without_start_fails() {
        let queue = TaskQueue::new();
        assert!(matches!(queue.stop().await, Err(QueueError::NotStarted)));
    }

    #[tokio::test]
    async fn config_is_locked_while_started() {
        let queue = TaskQueue::new();
        queue.set_delay(Duration::from_millis(5)).unwrap();
        assert_eq!(queue.delay(), Duration::from_millis(5));

        queue.start().await.unwrap();
        assert!(matches!(
            queue.set_delay(Duration::ZERO),
            Err(QueueError::InvalidWhileRunning)
        ));
        assert!(matches!(
            queue.set_cancel_on_exception(false),
            Err(QueueError::InvalidWhileRunning)
        ));
    }

    #[tokio::test]
    async fn deschedule_unknown_tag_fails() {
        let queue = TaskQueue::new();
        queue.schedule_tagged("a", noop()).await;
        assert!(matches!(
            queue.deschedule("nope").await,
            Err(QueueError::UnknownTag { .. })
        ));
    }

    #[tokio::test]
    async fn clear_cancels_all_pending() {
        let queue = TaskQueue::tagged("q");
        let mut rx = queue.events();
        queue.schedule_tagged("a", noop()).await;
        queue.schedule_tagged("b", noop()).await;

        queue.clear().await.unwrap();
        assert!(queue.is_empty());

        let mut canceled = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::Canceled {
                canceled.push(ev.tag.as_deref().unwrap().to_string());
            }
        }
        assert_eq!(canceled, vec!["a", "b"]);
    }
}
