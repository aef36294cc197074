//! # Tag-keyed queue registry.
//!
//! [`QueueRegistry`] maps tags to [`TaskQueue`] instances and lazily owns a
//! default queue. It is an explicitly constructed object: callers create
//! one, pass it around, and shut it down, rather than reaching for ambient
//! global state.
//!
//! ## Rules
//! - Registry tags are enforced unique; creating a taken tag fails with
//!   [`QueueError::DuplicateTag`].
//! - Empty or whitespace-only tags fail with [`QueueError::InvalidTag`] in
//!   `create`; the empty tag is reserved for the default queue, created on
//!   first access.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::QueueConfig;
use crate::core::TaskQueue;
use crate::error::QueueError;

/// Tag the default queue is registered under.
const DEFAULT_TAG: &str = "";

/// Registry of named queues plus a lazily created default queue.
#[derive(Default)]
pub struct QueueRegistry {
    queues: Mutex<HashMap<Arc<str>, TaskQueue>>,
}

impl QueueRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a queue under the given tag, with default
    /// configuration.
    pub fn create(&self, tag: impl Into<Arc<str>>) -> Result<TaskQueue, QueueError> {
        self.register(tag.into(), QueueConfig::default(), None)
    }

    /// Creates and registers a queue under the given tag.
    pub fn create_with(
        &self,
        tag: impl Into<Arc<str>>,
        config: QueueConfig,
    ) -> Result<TaskQueue, QueueError> {
        self.register(tag.into(), config, None)
    }

    /// Creates and registers a queue carrying an opaque payload, retrievable
    /// through [`TaskQueue::data`] / [`TaskQueue::data_as`].
    pub fn create_with_data(
        &self,
        tag: impl Into<Arc<str>>,
        data: Arc<dyn Any + Send + Sync>,
    ) -> Result<TaskQueue, QueueError> {
        self.register(tag.into(), QueueConfig::default(), Some(data))
    }

    /// Fails with [`QueueError::InvalidTag`] for empty or whitespace-only
    /// tags and [`QueueError::DuplicateTag`] when the tag is taken.
    fn register(
        &self,
        tag: Arc<str>,
        config: QueueConfig,
        data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<TaskQueue, QueueError> {
        if tag.trim().is_empty() {
            return Err(QueueError::InvalidTag);
        }

        let mut queues = self.queues.lock().unwrap();
        if queues.contains_key(&tag) {
            return Err(QueueError::DuplicateTag {
                tag: tag.to_string(),
            });
        }

        let queue = TaskQueue::build(Some(tag.clone()), config, data);
        queues.insert(tag, queue.clone());
        Ok(queue)
    }

    /// Looks up a registered queue by tag.
    pub fn get(&self, tag: &str) -> Option<TaskQueue> {
        self.queues.lock().unwrap().get(tag).cloned()
    }

    /// Returns the default queue, creating it under the empty tag on first
    /// access.
    pub fn default_queue(&self) -> TaskQueue {
        self.queues
            .lock()
            .unwrap()
            .entry(DEFAULT_TAG.into())
            .or_insert_with(TaskQueue::new)
            .clone()
    }

    /// Unregisters a queue by identity. Returns `true` when it was held by
    /// this registry (including as the default queue).
    ///
    /// The queue itself keeps working; only the registration is dropped.
    pub fn remove(&self, queue: &TaskQueue) -> bool {
        let mut queues = self.queues.lock().unwrap();
        let tag = queues
            .iter()
            .find(|(_, q)| *q == queue)
            .map(|(tag, _)| tag.clone());
        match tag {
            Some(tag) => queues.remove(&tag).is_some(),
            None => false,
        }
    }

    /// Snapshot of every registered queue, the default queue included if it
    /// was created.
    pub fn queues(&self) -> Vec<TaskQueue> {
        self.queues.lock().unwrap().values().cloned().collect()
    }

    /// Number of registered queues, the default queue included if it was
    /// created.
    pub fn len(&self) -> usize {
        self.queues.lock().unwrap().len()
    }

    /// Returns `true` when no queue is held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stops every started queue and drops all registrations.
    ///
    /// Pending items of stopped queues are preserved on the queues
    /// themselves; callers holding a handle can restart them.
    pub async fn shutdown(&self) {
        let all: Vec<TaskQueue> = {
            let mut queues = self.queues.lock().unwrap();
            queues.drain().map(|(_, q)| q).collect()
        };

        for queue in all {
            // Queues that never started are fine to leave as-is.
            let _ = queue.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_blank_tags() {
        let registry = QueueRegistry::new();
        assert!(matches!(registry.create(""), Err(QueueError::InvalidTag)));
        assert!(matches!(
            registry.create("   "),
            Err(QueueError::InvalidTag)
        ));
    }

    #[test]
    fn create_rejects_duplicate_tags() {
        let registry = QueueRegistry::new();
        registry.create("jobs").unwrap();
        assert!(matches!(
            registry.create("jobs"),
            Err(QueueError::DuplicateTag { .. })
        ));
    }

    #[test]
    fn get_returns_the_registered_queue() {
        let registry = QueueRegistry::new();
        let queue = registry.create("jobs").unwrap();
        let looked_up = registry.get("jobs").unwrap();
        assert_eq!(queue, looked_up);
        assert_eq!(looked_up.tag(), Some("jobs"));
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn created_queue_carries_its_payload() {
        struct Meta {
            owner: &'static str,
        }

        let registry = QueueRegistry::new();
        let queue = registry
            .create_with_data("jobs", Arc::new(Meta { owner: "ops" }))
            .unwrap();

        assert_eq!(queue.data_as::<Meta>().unwrap().owner, "ops");
        assert!(queue.data_as::<String>().is_none());
        assert!(registry.create("plain").unwrap().data().is_none());
    }

    #[test]
    fn default_queue_is_a_lazy_singleton() {
        let registry = QueueRegistry::new();
        assert!(registry.is_empty());

        let a = registry.default_queue();
        let b = registry.default_queue();
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn default_queue_is_registered_under_the_empty_tag() {
        let registry = QueueRegistry::new();
        assert!(registry.get("").is_none());

        let default = registry.default_queue();
        assert_eq!(registry.get("").unwrap(), default);
        assert!(registry.queues().contains(&default));

        assert!(registry.remove(&default));
        assert!(registry.get("").is_none());
    }

    #[test]
    fn remove_drops_only_the_registration() {
        let registry = QueueRegistry::new();
        let queue = registry.create("jobs").unwrap();

        assert!(registry.remove(&queue));
        assert!(!registry.remove(&queue));
        assert!(registry.get("jobs").is_none());

        // Foreign queues are not held here.
        assert!(!registry.remove(&TaskQueue::new()));
    }
}
