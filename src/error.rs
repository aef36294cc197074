//! Error types used by the queue runtime and work items.
//!
//! This module defines two main error enums:
//!
//! - [`QueueError`] — protocol misuse and registry failures, surfaced
//!   synchronously at the call site.
//! - [`TaskError`] — errors raised by individual work-item executions.
//!
//! Work-item faults never propagate out of the engine: they are converted
//! into a `TaskFaulted` event. Protocol misuse is never queued or retried.
//! Both types provide `as_label` for logging and assertions.

use thiserror::Error;

/// # Errors produced by queue operations.
///
/// These represent misuse of the queue protocol (starting twice, clearing
/// while an item executes, ...) or registry failures. They fail immediately
/// at the call site and leave the queue state untouched.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum QueueError {
    /// `start` was called on a queue that is already started.
    #[error("queue has already been started")]
    AlreadyStarted,

    /// `stop` was called on a queue that has not been started.
    #[error("queue has not been started")]
    NotStarted,

    /// `clear` was called while a work item is executing.
    #[error("queue is busy executing a work item")]
    Busy,

    /// `deschedule` found no queued (not-yet-run) item with the given tag.
    #[error("no queued work item with tag {tag:?}")]
    UnknownTag {
        /// The tag that was looked up.
        tag: String,
    },

    /// The work item is not in the queue (already executed, descheduled,
    /// or currently executing).
    #[error("work item is not in the queue")]
    NotInQueue,

    /// Configuration can only be changed while the queue is not started.
    #[error("can not be set while the queue is running")]
    InvalidWhileRunning,

    /// A queue with the given tag is already registered.
    #[error("a queue with tag {tag:?} already exists")]
    DuplicateTag {
        /// The conflicting registry tag.
        tag: String,
    },

    /// Registry tags must be non-empty and not whitespace-only.
    #[error("empty or whitespace-only tags are not allowed")]
    InvalidTag,

    /// Peek or dequeue on an empty collection. Internal: the engine checks
    /// emptiness before touching the head, so this is never reachable from
    /// the public surface.
    #[error("the work collection is empty")]
    EmptyCollection,
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/assertions.
    ///
    /// # Example
    /// ```
    /// use sequeue::QueueError;
    ///
    /// assert_eq!(QueueError::AlreadyStarted.as_label(), "queue_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::AlreadyStarted => "queue_already_started",
            QueueError::NotStarted => "queue_not_started",
            QueueError::Busy => "queue_busy",
            QueueError::UnknownTag { .. } => "unknown_tag",
            QueueError::NotInQueue => "not_in_queue",
            QueueError::InvalidWhileRunning => "invalid_while_running",
            QueueError::DuplicateTag { .. } => "duplicate_tag",
            QueueError::InvalidTag => "invalid_tag",
            QueueError::EmptyCollection => "empty_collection",
        }
    }
}

/// # Errors produced by work-item execution.
///
/// Raised by an item's action. The engine converts these into a
/// `TaskFaulted` event carrying the failing item's tag; they never escape
/// the engine. [`TaskError::Canceled`] is the exception to the rule: it is
/// treated as a graceful exit and does not fault the queue.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The action failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The action observed the cancellation token and aborted early.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/assertions.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Convenience constructor for a failure with a message.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Indicates whether this error faults the queue.
    ///
    /// Returns `false` for [`TaskError::Canceled`] — a cancelled item is a
    /// graceful exit, not a fault, so no `TaskFaulted` event is raised.
    pub fn is_fault(&self) -> bool {
        !matches!(self, TaskError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_error_labels_are_stable() {
        assert_eq!(QueueError::NotStarted.as_label(), "queue_not_started");
        assert_eq!(
            QueueError::UnknownTag { tag: "x".into() }.as_label(),
            "unknown_tag"
        );
        assert_eq!(QueueError::EmptyCollection.as_label(), "empty_collection");
    }

    #[test]
    fn canceled_is_not_a_fault() {
        assert!(!TaskError::Canceled.is_fault());
        assert!(TaskError::fail("boom").is_fault());
    }
}
