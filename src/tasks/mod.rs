//! Work-item abstractions: the task trait, closure adapter, and queue items.

mod item;
mod task;
mod task_fn;

pub use item::{WorkItem, WorkRef};
pub use task::{Task, TaskContext, TaskRef};
pub use task_fn::TaskFn;
