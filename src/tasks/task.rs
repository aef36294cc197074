//! # Task abstraction and execution context.
//!
//! This module defines the [`Task`] trait (async, cancelable) and the
//! [`TaskContext`] passed to every execution. The common handle type is
//! [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task receives a [`TaskContext`] carrying the owning queue handle and a
//! [`CancellationToken`]; it should periodically check the token to stop
//! cooperatively after the queue is stopped. The signal is advisory — the
//! engine never forcibly interrupts a running action.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::TaskQueue;
use crate::error::TaskError;

/// Shared handle to a task implementation.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable unit of work.
///
/// Implementors should regularly check `ctx.is_cancelled()` and return
/// [`TaskError::Canceled`] promptly after the queue is stopped. Returning
/// `Canceled` is a graceful exit: it does not raise a `TaskFaulted` event.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use sequeue::{Task, TaskContext, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Executes the task until completion or cancellation.
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError>;
}

/// Execution context handed to a work item's action.
///
/// Carries the owning queue (so an action may schedule further work or stop
/// the queue reentrantly), the item's tag, and the cancellation token of the
/// current run-state generation.
#[derive(Clone)]
pub struct TaskContext {
    /// Handle to the queue executing this item.
    pub queue: TaskQueue,
    /// Tag of the executing work item, if any.
    pub tag: Option<Arc<str>>,
    /// Cancellation token; signalled by `stop()`.
    pub token: CancellationToken,
}

impl TaskContext {
    /// Returns `true` once the queue's cancellation handle was signalled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
