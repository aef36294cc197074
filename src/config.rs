//! # Per-queue configuration.
//!
//! [`QueueConfig`] centralizes the settings a [`TaskQueue`](crate::TaskQueue)
//! snapshots into each run-state generation. Settings are mutable through the
//! facade only while the queue is not started.
//!
//! ## Sentinel values
//! - `delay = 0s` → no inter-item delay
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use std::time::Duration;

/// Configuration for one queue.
///
/// ## Field semantics
/// - `delay`: fixed pause applied before each work item (`0s` = none)
/// - `cancel_on_exception`: default for the mutable cancel flag carried by
///   `TaskFaulted` events; when it survives dispatch, the remainder of the
///   queue is cancelled
/// - `bus_capacity`: ring buffer size of the broadcast event stream
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Fixed delay before each work item's execution.
    pub delay: Duration,

    /// Whether a faulting work item aborts the remainder of the queue.
    ///
    /// Subscribers can override the decision per fault by flipping the
    /// cancel flag on the `TaskFaulted` event.
    pub cancel_on_exception: bool,

    /// Capacity of the broadcast event stream ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl QueueConfig {
    /// Returns the inter-item delay as an `Option`.
    ///
    /// - `None` → no delay
    /// - `Some(d)` → sleep `d` before each item
    #[inline]
    pub fn delay_opt(&self) -> Option<Duration> {
        if self.delay == Duration::ZERO {
            None
        } else {
            Some(self.delay)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `delay = 0s` (no inter-item delay)
    /// - `cancel_on_exception = true` (a fault aborts the rest of the queue)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            cancel_on_exception: true,
            bus_capacity: 1024,
        }
    }
}
