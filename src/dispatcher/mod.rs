//! Execution facilities: where due tasks go to run.
//!
//! The scheduler only depends on [`ExecutionFacility`]. [`Dispatcher`] is the
//! bundled implementation: a worker thread draining a FIFO queue, with
//! optional queue expiry for tasks that are not marked non-expiring.

pub mod worker;

pub use worker::Dispatcher;

use crate::scheduler::tasks::ScheduledTask;

/// Accepts ownership of a due task and runs it on its own concurrency domain.
///
/// `submit` must not block on the task body; the scheduler calls it from its
/// waiting thread and never touches the task again.
pub trait ExecutionFacility: Send + Sync {
    /// Take ownership of `task`. When `non_expiring` is set the task must run
    /// even if it waits past the facility's own expiry window.
    fn submit(&self, task: ScheduledTask, non_expiring: bool);
}

impl<F> ExecutionFacility for F
where
    F: Fn(ScheduledTask, bool) + Send + Sync,
{
    fn submit(&self, task: ScheduledTask, non_expiring: bool) {
        self(task, non_expiring);
    }
}
