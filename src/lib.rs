//! # sequeue
//!
//! **Sequential task queue**: work items run one at a time, in submission
//! order, with a lifecycle-event protocol that lets observers watch and
//! influence execution without blocking it.
//!
//! ## Core concepts
//!
//! - [`TaskQueue`]: the queue facade — schedule, start, stop, deschedule,
//!   clear
//! - [`Task`] / [`TaskFn`]: async, cancelable unit of work
//! - [`WorkItem`]: one scheduled unit (optional tag + action), identified by
//!   handle
//! - [`Subscribe`] / [`SubscriberSet`]: ordered, awaited event dispatch with
//!   veto power
//! - [`Bus`] / [`QueueEvent`]: passive broadcast stream of lifecycle events
//! - [`QueueRegistry`]: tag-keyed lookup of named queues plus a lazy default
//!
//! ## Architecture
//!
//! ```text
//!                      ┌─────────────────────┐
//!   schedule ────────► │      TaskQueue      │ ◄──── start / stop
//!                      │      (facade)       │
//!                      └──────────┬──────────┘
//!                  enqueue + wake │
//!                      ┌──────────▼──────────┐
//!                      │       Engine        │  one worker per
//!                      │  (sequential drain) │  run-state generation
//!                      └──────────┬──────────┘
//!               lifecycle events  │
//!              ┌──────────────────┼──────────────────┐
//!              ▼                  ▼                  ▼
//!      ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!      │ SubscriberSet│   │     Bus      │   │  wait_empty  │
//!      │ (veto-able)  │   │ (broadcast)  │   │   (helper)   │
//!      └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Execution guarantees
//!
//! - **FIFO**: submission order is execution order.
//! - **At most one in flight**: a queue never runs two actions concurrently.
//! - **Fault containment**: an action's error never propagates out of the
//!   engine; it becomes a `TaskFaulted` event. By default the rest of the
//!   queue is cancelled; any subscriber can flip the event's cancel flag to
//!   keep going.
//! - **Veto-able deschedule**: a not-yet-run item can be removed, unless a
//!   subscriber vetoes via the `Canceling` event.
//! - **Stop preserves work**: stopping cancels the current generation but
//!   keeps pending items; the next start resumes them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sequeue::{TaskContext, TaskFn, TaskQueue};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sequeue::QueueError> {
//!     let queue = TaskQueue::tagged("jobs");
//!
//!     queue
//!         .schedule_tagged("first", TaskFn::arc(|_ctx: TaskContext| async {
//!             println!("first");
//!             Ok(())
//!         }))
//!         .await
//!         .schedule_tagged("second", TaskFn::arc(|ctx: TaskContext| async move {
//!             if ctx.is_cancelled() {
//!                 return Err(sequeue::TaskError::Canceled);
//!             }
//!             println!("second");
//!             Ok(())
//!         }))
//!         .await;
//!
//!     queue.start().await?;
//!     queue.wait_empty().await;
//!     queue.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `logging`: enables [`LogWriter`], a stdout subscriber for demos and
//!   debugging.

mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

pub use crate::core::{QueueRegistry, TaskQueue};
pub use config::QueueConfig;
pub use error::{QueueError, TaskError};
pub use events::{Bus, EventKind, QueueEvent};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Task, TaskContext, TaskFn, TaskRef, WorkItem, WorkRef};

#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
