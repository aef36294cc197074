//! # Work items.
//!
//! A [`WorkItem`] pairs an optional tag with the action to run. Items are
//! created at schedule time, immutable afterwards, and identified by `Arc`
//! pointer identity — tags are a lookup convenience, unique only by
//! convention, while identity removal (deschedule) always targets one
//! specific scheduled item.

use std::sync::Arc;

use crate::tasks::task::TaskRef;

/// Shared handle to a scheduled work item.
///
/// Identity (`Arc::ptr_eq`) distinguishes two items scheduled with the same
/// tag.
pub type WorkRef = Arc<WorkItem>;

/// One schedulable unit of work: an optional tag plus the action.
pub struct WorkItem {
    tag: Option<Arc<str>>,
    task: TaskRef,
}

impl WorkItem {
    /// Creates an untagged work item.
    pub fn new(task: TaskRef) -> WorkRef {
        Arc::new(Self { tag: None, task })
    }

    /// Creates a tagged work item.
    ///
    /// Tags are free-form and not required to be unique; `deschedule(tag)`
    /// targets the first queued match.
    pub fn tagged(tag: impl Into<Arc<str>>, task: TaskRef) -> WorkRef {
        Arc::new(Self {
            tag: Some(tag.into()),
            task,
        })
    }

    /// Returns the item's tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Returns the item's tag as the shared representation used in events.
    pub(crate) fn tag_arc(&self) -> Option<Arc<str>> {
        self.tag.clone()
    }

    /// Returns the action to execute.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }
}

impl std::fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkItem").field("tag", &self.tag).finish()
    }
}
