//! # Ordered, awaited event dispatch.
//!
//! [`SubscriberSet`] holds the subscribers registered on one queue and
//! dispatches each event to all of them, **sequentially in registration
//! order**, awaiting each handler before calling the next.
//!
//! ```text
//! raise(event)
//!     │
//!     ├──► subscriber 1.on_event().await   (may flip event.cancel)
//!     ├──► subscriber 2.on_event().await
//!     └──► subscriber N.on_event().await
//!     ▼
//! engine reads event.cancel
//! ```
//!
//! ## Rules
//! - **Ordered-in-registration**: subscriber K always sees an event before
//!   subscriber K+1.
//! - **Awaited**: `dispatch` resolves only after every handler finished,
//!   so flag mutations are visible to the caller.
//! - **Panic isolation**: a panicking handler is caught via `catch_unwind`
//!   and reported as `SubscriberPanicked` on the bus; dispatch continues
//!   with the next subscriber.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::events::{Bus, QueueEvent};
use crate::subscribers::Subscribe;

/// Registration-ordered set of subscribers for one queue.
pub struct SubscriberSet {
    subs: RwLock<Vec<Arc<dyn Subscribe>>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates an empty set reporting panics to the given bus.
    pub fn new(bus: Bus) -> Self {
        Self {
            subs: RwLock::new(Vec::new()),
            bus,
        }
    }

    /// Appends a subscriber; it will be dispatched after all previously
    /// registered subscribers.
    pub async fn add(&self, sub: Arc<dyn Subscribe>) {
        self.subs.write().await.push(sub);
    }

    /// Returns the number of registered subscribers.
    pub async fn len(&self) -> usize {
        self.subs.read().await.len()
    }

    /// Returns `true` when no subscriber is registered.
    pub async fn is_empty(&self) -> bool {
        self.subs.read().await.is_empty()
    }

    /// Dispatches one event to every subscriber, in registration order.
    ///
    /// Resolves after the last handler finished, so any cancel-flag
    /// mutation is visible to the caller. Panicking handlers are reported
    /// on the bus and skipped.
    pub async fn dispatch(&self, event: &QueueEvent) {
        // Snapshot under the read lock; handlers run without holding it so
        // they may register further subscribers reentrantly.
        let snapshot: Vec<Arc<dyn Subscribe>> = self.subs.read().await.clone();

        for sub in snapshot {
            let fut = sub.on_event(event);
            if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                let info = {
                    let any = &*panic_err;
                    if let Some(msg) = any.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = any.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    }
                };
                self.bus
                    .publish(QueueEvent::subscriber_panicked(sub.name(), info));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Tagger {
        order: Arc<std::sync::Mutex<Vec<&'static str>>>,
        id: &'static str,
    }

    #[async_trait]
    impl Subscribe for Tagger {
        async fn on_event(&self, _event: &QueueEvent) {
            self.order.lock().unwrap().push(self.id);
        }
    }

    struct Panicker;

    #[async_trait]
    impl Subscribe for Panicker {
        async fn on_event(&self, _event: &QueueEvent) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    struct Counter(AtomicUsize);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &QueueEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn dispatch_respects_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let set = SubscriberSet::new(Bus::new(8));
        set.add(Arc::new(Tagger {
            order: order.clone(),
            id: "first",
        }))
        .await;
        set.add(Arc::new(Tagger {
            order: order.clone(),
            id: "second",
        }))
        .await;

        set.dispatch(&QueueEvent::new(EventKind::Scheduled)).await;
        set.dispatch(&QueueEvent::new(EventKind::Executing)).await;

        assert_eq!(
            *order.lock().unwrap(),
            vec!["first", "second", "first", "second"]
        );
    }

    #[tokio::test]
    async fn panicking_subscriber_is_isolated_and_reported() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let set = SubscriberSet::new(bus);
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        set.add(Arc::new(Panicker)).await;
        set.add(counter.clone()).await;

        set.dispatch(&QueueEvent::new(EventKind::Executed)).await;

        // Dispatch continued past the panic.
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        let report = rx.recv().await.expect("panic report");
        assert_eq!(report.kind, EventKind::SubscriberPanicked);
        assert_eq!(report.tag.as_deref(), Some("panicker"));
        assert_eq!(report.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn flag_mutation_is_visible_after_dispatch() {
        struct Flipper;

        #[async_trait]
        impl Subscribe for Flipper {
            async fn on_event(&self, event: &QueueEvent) {
                event.set_cancel(false);
            }
        }

        let set = SubscriberSet::new(Bus::new(8));
        set.add(Arc::new(Flipper)).await;

        let flag = Arc::new(AtomicBool::new(true));
        let ev = QueueEvent::new(EventKind::TaskFaulted).with_cancel_flag(flag.clone());
        set.dispatch(&ev).await;

        assert!(!flag.load(Ordering::SeqCst));
    }
}
