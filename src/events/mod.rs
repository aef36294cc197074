//! Event model and broadcast bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{EventKind, QueueEvent};
