#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sequeue::{EventKind, QueueEvent, Subscribe};

/// Subscriber that records every dispatched event, in order.
pub struct Recorder {
    events: Mutex<Vec<QueueEvent>>,
}

impl Recorder {
    pub fn arc() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    /// Snapshot of all recorded events, in dispatch order.
    pub fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Event kinds in dispatch order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }

    /// Work-item tags of all recorded events of the given kind, in order.
    pub fn tags_of(&self, kind: EventKind) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.tag.as_deref().unwrap_or("").to_string())
            .collect()
    }

    /// Number of recorded events of the given kind.
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.events().iter().filter(|e| e.kind == kind).count()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &QueueEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
