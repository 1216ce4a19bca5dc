//! Shared helpers for integration tests.

use delay_scheduler::{EventId, ScheduledTask, SchedulerConfig, TaskScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Generous upper bound for anything that should happen "soon".
pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(3);

/// One submission observed by the recording facility.
#[derive(Debug)]
pub(crate) struct Dispatched {
    pub event_id: EventId,
    pub non_expiring: bool,
    pub task: ScheduledTask,
}

/// Start a scheduler whose facility forwards every submission to a channel.
pub(crate) fn recording_scheduler() -> (TaskScheduler, crossbeam_channel::Receiver<Dispatched>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let facility = move |task: ScheduledTask, non_expiring: bool| {
        let _ = tx.send(Dispatched {
            event_id: task.event_id(),
            non_expiring,
            task,
        });
    };
    let scheduler = TaskScheduler::start(&SchedulerConfig::default(), Arc::new(facility))
        .expect("start scheduler");
    (scheduler, rx)
}

/// Receive `count` dispatches or panic on timeout.
pub(crate) fn recv_ids(rx: &crossbeam_channel::Receiver<Dispatched>, count: usize) -> Vec<EventId> {
    (0..count)
        .map(|_| rx.recv_timeout(RECV_TIMEOUT).expect("dispatch").event_id)
        .collect()
}

/// Counts how often a task body ran and how often its captures were dropped.
#[derive(Clone, Default)]
pub(crate) struct DropTracker {
    ran: Arc<AtomicUsize>,
    dropped: Arc<AtomicUsize>,
}

struct DropGuard(Arc<AtomicUsize>);

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl DropTracker {
    /// A task body that records running and, separately, being dropped.
    pub(crate) fn body(&self) -> impl FnOnce() + Send + 'static {
        let ran = Arc::clone(&self.ran);
        let guard = DropGuard(Arc::clone(&self.dropped));
        move || {
            let _guard = guard;
            ran.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn ran(&self) -> usize {
        self.ran.load(Ordering::SeqCst)
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}
