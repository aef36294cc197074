//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [scheduled] queue="" tag=Some("a")
//! [executing] queue="" tag=Some("a")
//! [faulted] queue="" tag=Some("a") err=Some("boom") cancel=true
//! [executed] queue="" tag=Some("a")
//! [empty] queue=""
//! ```

use async_trait::async_trait;

use crate::events::{EventKind, QueueEvent};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event lines for
/// debugging and demonstration purposes. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &QueueEvent) {
        let queue = e.queue.as_deref().unwrap_or("");
        match e.kind {
            EventKind::Scheduled => {
                println!("[scheduled] queue={queue:?} tag={:?}", e.tag);
            }
            EventKind::Canceling => {
                println!(
                    "[canceling] queue={queue:?} tag={:?} cancel={}",
                    e.tag,
                    e.cancel_requested()
                );
            }
            EventKind::Canceled => {
                println!("[canceled] queue={queue:?} tag={:?}", e.tag);
            }
            EventKind::Executing => {
                println!("[executing] queue={queue:?} tag={:?}", e.tag);
            }
            EventKind::Executed => {
                println!("[executed] queue={queue:?} tag={:?}", e.tag);
            }
            EventKind::TaskFaulted => {
                println!(
                    "[faulted] queue={queue:?} tag={:?} err={:?} cancel={}",
                    e.tag,
                    e.error,
                    e.cancel_requested()
                );
            }
            EventKind::Started => {
                println!("[started] queue={queue:?}");
            }
            EventKind::Stopped => {
                println!("[stopped] queue={queue:?}");
            }
            EventKind::Empty => {
                println!("[empty] queue={queue:?}");
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panic] sub={:?} err={:?}", e.tag, e.error);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
