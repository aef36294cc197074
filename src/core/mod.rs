//! Queue core: ordered collection, run state, execution engine, facade,
//! and registry.

mod collection;
mod engine;
mod queue;
mod registry;
mod state;

pub use queue::TaskQueue;
pub use registry::QueueRegistry;

pub(crate) use collection::TaskCollection;
pub(crate) use state::{ExecSlot, RunState};
