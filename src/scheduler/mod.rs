//! Delayed-task scheduler.
//!
//! Tasks are kept in a deadline-ordered heap and handed to an
//! [`ExecutionFacility`](crate::dispatcher::ExecutionFacility) by a single
//! waiting thread once due. Cancellation removes the task's identity from a
//! side index; the heap entry is discarded lazily when it comes due.

pub mod executor_bridge;
mod queue;
pub mod runner;
pub mod tasks;

pub use executor_bridge::AsyncBridge;
pub use runner::TaskScheduler;
pub use tasks::{EventId, ExpiryPolicy, ScheduledTask, TaskBody, create_scheduler_task};
