//! Scheduler→async bridge.
//!
//! Provides [`AsyncBridge`], an [`ExecutionFacility`](crate::dispatcher::ExecutionFacility)
//! that forwards due tasks into a tokio channel so an async consumer can run
//! them on its own runtime.

use crate::dispatcher::ExecutionFacility;
use crate::scheduler::tasks::ScheduledTask;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Forwards dispatched tasks to an async receiver.
pub struct AsyncBridge {
    /// Channel for handing tasks to the async side.
    task_tx: mpsc::UnboundedSender<ScheduledTask>,
}

impl AsyncBridge {
    /// Create a new bridge with the given task channel.
    pub fn new(task_tx: mpsc::UnboundedSender<ScheduledTask>) -> Self {
        Self { task_tx }
    }

    /// Create a bridge together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ScheduledTask>) {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        (Self::new(task_tx), task_rx)
    }
}

impl ExecutionFacility for AsyncBridge {
    fn submit(&self, mut task: ScheduledTask, non_expiring: bool) {
        if non_expiring {
            task.set_dont_expire();
        }
        let event_id = task.event_id();
        match self.task_tx.send(task) {
            Ok(()) => debug!("forwarded event {event_id} to async consumer"),
            Err(_) => warn!("failed to forward event {event_id}: channel closed"),
        }
    }
}
