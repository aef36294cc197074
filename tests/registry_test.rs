mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sequeue::{EventKind, QueueRegistry, TaskContext, TaskFn, TaskRef};

use common::Recorder;

fn noop() -> TaskRef {
    TaskFn::arc(|_ctx: TaskContext| async { Ok(()) })
}

#[tokio::test]
async fn named_queues_run_independently() {
    let registry = QueueRegistry::new();
    let alpha = registry.create("alpha").unwrap();
    let beta = registry.create("beta").unwrap();

    let rec_alpha = Recorder::arc();
    let rec_beta = Recorder::arc();
    alpha.subscribe(rec_alpha.clone()).await;
    beta.subscribe(rec_beta.clone()).await;

    alpha.schedule_tagged("a1", noop()).await;
    beta.schedule_tagged("b1", noop()).await;
    alpha.start().await.unwrap();
    beta.start().await.unwrap();
    alpha.wait_empty().await;
    beta.wait_empty().await;

    assert_eq!(rec_alpha.tags_of(EventKind::Executed), ["a1"]);
    assert_eq!(rec_beta.tags_of(EventKind::Executed), ["b1"]);

    // Events carry the tag of the queue that raised them.
    for ev in rec_alpha.events() {
        assert_eq!(ev.queue.as_deref(), Some("alpha"));
    }
    for ev in rec_beta.events() {
        assert_eq!(ev.queue.as_deref(), Some("beta"));
    }
}

#[tokio::test]
async fn default_queue_executes_work() {
    let registry = QueueRegistry::new();
    let queue = registry.default_queue();
    assert_eq!(queue, registry.default_queue());

    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    queue
        .schedule(TaskFn::arc(move |_ctx: TaskContext| {
            let flag = flag.clone();
            async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        }))
        .await;
    queue.start().await.unwrap();
    queue.wait_empty().await;

    assert!(ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn shutdown_stops_started_queues_and_clears_registrations() {
    let registry = QueueRegistry::new();
    let jobs = registry.create("jobs").unwrap();
    let idle = registry.create("idle").unwrap();
    jobs.start().await.unwrap();
    assert!(jobs.is_started());

    registry.shutdown().await;

    assert!(jobs.is_stopped());
    assert!(!jobs.is_started());
    assert!(!idle.is_started());
    assert!(registry.is_empty());
    assert!(registry.get("jobs").is_none());

    // Handles survive the registry; a fresh registration works.
    let recreated = registry.create("jobs").unwrap();
    assert_ne!(recreated, jobs);
}
