//! # Execution engine: sequential drain of the work collection.
//!
//! The engine is a background worker spawned by `start()`. It replaces the
//! original recursive continuation loop with an explicit iterative drain, so
//! call-stack depth stays constant no matter how long the queue grows, while
//! keeping the same ordering and reentrancy-guard semantics.
//!
//! ## Per-item flow
//! ```text
//! wake (notify or start)
//!   │
//!   ▼
//! loop {
//!   ├─► token cancelled?          → exit
//!   ├─► prior generation busy?    → park until it hands off
//!   ├─► collection empty?         → Empty (if this pass ran something), park
//!   ├─► optional delay            (cancellable sleep; head re-validated
//!   │                              afterwards, a removed item never runs)
//!   ├─► head → current, is_running = is_busy = true
//!   ├─► raise Executing
//!   ├─► run action (panic → TaskError::Fail)
//!   │     └─ fault → raise TaskFaulted{cancel: cancel_on_exception}
//!   │              → flag survived dispatch? drop head silently,
//!   │                Canceled for every remaining item, in order
//!   ├─► raise Executed, current = None
//!   ├─► dequeue head (if still present)
//!   └─► is_busy = false, continue
//! }
//! ```
//!
//! ## Rules
//! - One worker per run-state generation; at most one action in flight.
//! - [`advance`] is the facade-side trigger: a no-op while `is_busy` (the
//!   in-flight pass picks the new item up itself), a no-op before `start`,
//!   a no-op after cancellation.
//! - Cancellation is advisory: the worker halts before the next item but
//!   never interrupts a running action.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::{select, time};

use crate::core::{RunState, TaskQueue};
use crate::error::TaskError;
use crate::events::EventKind;
use crate::tasks::{TaskContext, WorkRef};

/// Facade-side trigger: wakes the worker if a pass may make progress.
///
/// Keeps the classic guard semantics:
/// 1. cancelled → no further progress, no event;
/// 2. busy → reentrancy guard: record "idle from this call's perspective"
///    (`is_running = false`) and defer to the in-flight pass;
/// 3. not started → queued items wait for `start()`;
/// 4. otherwise wake the worker.
pub(crate) fn advance(state: &RunState) {
    if state.token.is_cancelled() {
        return;
    }
    if state.is_busy() {
        state.set_running(false);
        return;
    }
    if !state.is_started() {
        return;
    }
    state.notify().notify_one();
}

/// Background worker driving one run-state generation.
pub(crate) struct Engine {
    state: Arc<RunState>,
    queue: TaskQueue,
}

impl Engine {
    pub(crate) fn new(queue: TaskQueue, state: Arc<RunState>) -> Self {
        Self { state, queue }
    }

    /// Worker main loop: park until woken, drain, repeat until cancelled.
    pub(crate) async fn run(self) {
        loop {
            select! {
                _ = self.state.token.cancelled() => break,
                _ = self.state.notify().notified() => {}
            }
            self.drain().await;
            if self.state.token.is_cancelled() {
                break;
            }
        }
        self.state.set_running(false);
        // Hand-off: a successor generation's worker may be parked waiting
        // for this generation's in-flight action to unwind.
        self.state.notify().notify_one();
    }

    /// Executes head items until the collection is empty or the generation
    /// is cancelled. `Empty` is edge-triggered: raised only when this pass
    /// actually ran something and left the collection empty.
    async fn drain(&self) {
        let mut ran_any = false;

        loop {
            if self.state.token.is_cancelled() {
                return;
            }
            if !self.state.is_started() {
                return;
            }
            // A previous generation's action may still be unwinding; its
            // worker hands the wakeup over once it exits.
            if self.state.is_busy() {
                return;
            }

            let head = self.state.collection.lock().unwrap().peek();
            let item = match head {
                Ok(item) => item,
                Err(_) => {
                    self.state.set_running(false);
                    if ran_any {
                        self.queue.raise(self.queue.event(EventKind::Empty)).await;
                    }
                    return;
                }
            };

            if let Some(delay) = self.state.config.delay_opt() {
                let sleep = time::sleep(delay);
                tokio::pin!(sleep);
                select! {
                    _ = &mut sleep => {}
                    _ = self.state.token.cancelled() => { return; }
                }
                // A clear or deschedule may have removed the head during
                // the sleep; a removed item must never execute.
                if !self.state.collection.lock().unwrap().head_is(&item) {
                    continue;
                }
            }

            self.execute(&item).await;
            ran_any = true;
        }
    }

    /// Runs one item: Executing → action → (TaskFaulted?) → Executed →
    /// dequeue. `is_busy` spans the whole window, including suspension
    /// inside the action.
    async fn execute(&self, item: &WorkRef) {
        self.state.set_current(Some(item.clone()));
        self.state.set_running(true);
        self.state.set_busy(true);

        self.queue
            .raise(
                self.queue
                    .event(EventKind::Executing)
                    .with_tag_opt(item.tag_arc()),
            )
            .await;

        let ctx = TaskContext {
            queue: self.queue.clone(),
            tag: item.tag_arc(),
            token: self.state.token.clone(),
        };
        let fut = item.task().run(ctx);
        let res = match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(res) => res,
            Err(panic_err) => Err(TaskError::fail(panic_message(panic_err))),
        };

        if let Err(err) = res {
            if err.is_fault() {
                self.fault(item, &err).await;
            }
        }

        self.queue
            .raise(
                self.queue
                    .event(EventKind::Executed)
                    .with_tag_opt(item.tag_arc()),
            )
            .await;
        self.state.set_current(None);

        {
            let mut coll = self.state.collection.lock().unwrap();
            // The head survives unless a fault-triggered abort already
            // removed everything.
            if coll.head_is(item) {
                let _ = coll.dequeue();
            }
        }
        self.state.set_busy(false);
    }

    /// Handles a work-item fault: raises `TaskFaulted` with the mutable
    /// cancel flag defaulted to the queue's policy, then aborts the rest of
    /// the queue if no subscriber opted out.
    async fn fault(&self, item: &WorkRef, err: &TaskError) {
        let flag = Arc::new(AtomicBool::new(self.state.config.cancel_on_exception));
        let ev = self
            .queue
            .event(EventKind::TaskFaulted)
            .with_tag_opt(item.tag_arc())
            .with_error(err.to_string())
            .with_cancel_flag(flag.clone());
        self.queue.raise(ev).await;

        if flag.load(Ordering::SeqCst) {
            self.abort_remaining(item).await;
        }
    }

    /// Cancels every item still queued behind the faulting head, in order.
    ///
    /// The head itself is dropped silently — it already got its
    /// `TaskFaulted` and will get its `Executed`. `is_busy` is unset first
    /// so the abort is not subject to the public clear precondition.
    async fn abort_remaining(&self, head: &WorkRef) {
        self.state.set_busy(false);

        let drained = {
            let mut coll = self.state.collection.lock().unwrap();
            if coll.head_is(head) {
                let _ = coll.dequeue();
            }
            coll.drain_all()
        };

        for item in drained {
            self.queue
                .raise(
                    self.queue
                        .event(EventKind::Canceled)
                        .with_tag_opt(item.tag_arc()),
                )
                .await;
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(panic_err: Box<dyn std::any::Any + Send>) -> String {
    let any = &*panic_err;
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
