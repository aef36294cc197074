//! # Ordered work collection.
//!
//! FIFO container of scheduled work items. Insertion order is execution
//! order. The head leaves the collection in exactly three ways: `dequeue`
//! after its execution finished, identity `remove` before it ever started
//! (deschedule), or a bulk drain (clear).
//!
//! ## Rules
//! - `enqueue` always succeeds; `peek`/`dequeue` fail with
//!   [`QueueError::EmptyCollection`] when empty (internal-only: the engine
//!   checks emptiness first, so the error never crosses the public surface).
//! - `remove` targets the first occurrence by `Arc` pointer identity and
//!   preserves the relative order of the remaining items.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::QueueError;
use crate::tasks::WorkRef;

/// FIFO collection of not-yet-run work items.
#[derive(Default)]
pub(crate) struct TaskCollection {
    items: VecDeque<WorkRef>,
}

impl TaskCollection {
    /// Creates an empty collection.
    pub(crate) fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Appends an item at the tail.
    pub(crate) fn enqueue(&mut self, item: WorkRef) {
        self.items.push_back(item);
    }

    /// Returns the head item without removing it.
    pub(crate) fn peek(&self) -> Result<WorkRef, QueueError> {
        self.items
            .front()
            .cloned()
            .ok_or(QueueError::EmptyCollection)
    }

    /// Removes and returns the head item.
    pub(crate) fn dequeue(&mut self) -> Result<WorkRef, QueueError> {
        self.items.pop_front().ok_or(QueueError::EmptyCollection)
    }

    /// Removes the first occurrence of `item` by identity.
    ///
    /// Returns `true` when found; the relative order of the remaining items
    /// is preserved.
    pub(crate) fn remove(&mut self, item: &WorkRef) -> bool {
        match self.items.iter().position(|x| Arc::ptr_eq(x, item)) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns `true` when the head is identity-equal to `item`.
    pub(crate) fn head_is(&self, item: &WorkRef) -> bool {
        self.items
            .front()
            .map(|x| Arc::ptr_eq(x, item))
            .unwrap_or(false)
    }

    /// Returns `true` when `item` is in the collection.
    pub(crate) fn contains(&self, item: &WorkRef) -> bool {
        self.items.iter().any(|x| Arc::ptr_eq(x, item))
    }

    /// Iterates items in queue order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &WorkRef> {
        self.items.iter()
    }

    /// Removes every item, returning them in queue order.
    pub(crate) fn drain_all(&mut self) -> Vec<WorkRef> {
        self.items.drain(..).collect()
    }

    /// Number of items currently held (including an executing head).
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no item is held.
    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueueError;
    use crate::tasks::{TaskContext, TaskFn, WorkItem};

    fn item(tag: &str) -> WorkRef {
        WorkItem::tagged(tag, TaskFn::arc(|_ctx: TaskContext| async { Ok(()) }))
    }

    #[test]
    fn fifo_order_is_preserved() {
        let mut coll = TaskCollection::new();
        let (a, b, c) = (item("a"), item("b"), item("c"));
        coll.enqueue(a.clone());
        coll.enqueue(b.clone());
        coll.enqueue(c.clone());

        assert_eq!(coll.len(), 3);
        assert!(Arc::ptr_eq(&coll.peek().unwrap(), &a));
        assert!(Arc::ptr_eq(&coll.dequeue().unwrap(), &a));
        assert!(Arc::ptr_eq(&coll.dequeue().unwrap(), &b));
        assert!(Arc::ptr_eq(&coll.dequeue().unwrap(), &c));
        assert!(coll.is_empty());
    }

    #[test]
    fn peek_and_dequeue_fail_on_empty() {
        let mut coll = TaskCollection::new();
        assert!(matches!(coll.peek(), Err(QueueError::EmptyCollection)));
        assert!(matches!(coll.dequeue(), Err(QueueError::EmptyCollection)));
    }

    #[test]
    fn remove_targets_identity_and_keeps_order() {
        let mut coll = TaskCollection::new();
        // Two items with the same tag: identity tells them apart.
        let (a, b1, b2, c) = (item("a"), item("b"), item("b"), item("c"));
        coll.enqueue(a.clone());
        coll.enqueue(b1.clone());
        coll.enqueue(b2.clone());
        coll.enqueue(c.clone());

        assert!(coll.remove(&b2));
        assert!(!coll.remove(&b2));
        assert_eq!(coll.len(), 3);

        assert!(Arc::ptr_eq(&coll.dequeue().unwrap(), &a));
        assert!(Arc::ptr_eq(&coll.dequeue().unwrap(), &b1));
        assert!(Arc::ptr_eq(&coll.dequeue().unwrap(), &c));
    }

    #[test]
    fn drain_all_returns_queue_order() {
        let mut coll = TaskCollection::new();
        let (a, b) = (item("a"), item("b"));
        coll.enqueue(a.clone());
        coll.enqueue(b.clone());

        let drained = coll.drain_all();
        assert!(coll.is_empty());
        assert_eq!(drained.len(), 2);
        assert!(Arc::ptr_eq(&drained[0], &a));
        assert!(Arc::ptr_eq(&drained[1], &b));
    }

    #[test]
    fn head_is_checks_identity() {
        let mut coll = TaskCollection::new();
        let (a, b) = (item("a"), item("b"));
        coll.enqueue(a.clone());
        coll.enqueue(b.clone());
        assert!(coll.head_is(&a));
        assert!(!coll.head_is(&b));
    }
}
