//! Scheduler waiting loop.
//!
//! Spawns one dedicated thread that sleeps until the earliest deadline (or
//! until signalled), then hands due tasks to an [`ExecutionFacility`].
//! Producers on any thread schedule and cancel through `&TaskScheduler`.

use crate::config::SchedulerConfig;
use crate::dispatcher::ExecutionFacility;
use crate::error::{Result, SchedulerError};
use crate::lifecycle::ThreadState;
use crate::scheduler::queue::{EventQueue, Insertion, Popped};
use crate::scheduler::tasks::{EventId, ScheduledTask};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{JoinHandle, ThreadId};
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct Inner {
    state: ThreadState,
    queue: EventQueue,
    /// Set while the loop is inside `submit` with the lock released.
    dispatching: bool,
}

#[derive(Default)]
struct Shared {
    inner: Mutex<Inner>,
    /// Wakes the waiting loop. Only the scheduler thread waits on it.
    signal: Condvar,
    /// Notified when an in-flight dispatch completes.
    settled: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Delayed-task scheduler with a single waiting thread.
pub struct TaskScheduler {
    shared: Arc<Shared>,
    thread_id: ThreadId,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TaskScheduler {
    /// Spawn the waiting thread. Due tasks are submitted to `facility`.
    pub fn start(config: &SchedulerConfig, facility: Arc<dyn ExecutionFacility>) -> Result<Self> {
        let shared = Arc::new(Shared::default());
        let loop_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run_loop(&loop_shared, facility.as_ref()))
            .map_err(|e| SchedulerError::Thread(format!("cannot spawn scheduler thread: {e}")))?;

        info!("scheduler started on thread '{}'", config.thread_name);
        Ok(Self {
            shared,
            thread_id: worker.thread().id(),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Schedule `task` to run after its delay.
    ///
    /// Returns the task's identity, or `0` when the task was rejected.
    /// Rejected tasks are dropped without running. There are two distinct
    /// rejections:
    ///
    /// - the scheduler has shut down, and [`state`](Self::state) reports
    ///   [`ThreadState::Terminated`];
    /// - the task carries a caller-chosen identity that is already pending.
    ///   The scheduler keeps running and later tasks are accepted.
    pub fn add_event(&self, task: ScheduledTask) -> EventId {
        let mut inner = self.shared.lock();
        if !inner.state.is_running() {
            drop(inner);
            debug!("rejecting event: scheduler has shut down");
            return 0;
        }

        let insertion = inner.queue.insert(task, Instant::now());
        match insertion {
            Insertion::Queued { event_id, earliest } => {
                drop(inner);
                if earliest {
                    self.shared.signal.notify_one();
                }
                event_id
            }
            Insertion::Duplicate(task) => {
                drop(inner);
                warn!(
                    "rejecting event {}: caller-chosen identity already pending (scheduler still running)",
                    task.event_id()
                );
                0
            }
        }
    }

    /// Cancel a pending task. Returns `true` if it was still pending.
    ///
    /// The heap entry is left in place and discarded when it comes due.
    pub fn stop_event(&self, event_id: EventId) -> bool {
        if event_id == 0 {
            return false;
        }
        self.shared.lock().queue.cancel(event_id)
    }

    /// Terminate the scheduler and drop every pending task unrun.
    ///
    /// When called from a thread other than the scheduler's, this also waits
    /// for an in-flight dispatch to finish, so nothing is submitted after it
    /// returns. Calling it again is a no-op.
    pub fn shutdown(&self) {
        let on_scheduler_thread = std::thread::current().id() == self.thread_id;
        let drained = {
            let mut inner = self.shared.lock();
            inner.state = ThreadState::Terminated;
            let drained = inner.queue.drain();
            if !on_scheduler_thread {
                while inner.dispatching {
                    inner = self
                        .shared
                        .settled
                        .wait(inner)
                        .unwrap_or_else(|e| e.into_inner());
                }
            }
            drained
        };
        self.shared.signal.notify_one();

        if !drained.is_empty() {
            info!("scheduler shutdown dropped {} pending tasks", drained.len());
        }
    }

    /// Wait for the scheduler thread to exit. Call [`shutdown`](Self::shutdown)
    /// first. Returns immediately when called from the scheduler thread.
    pub fn join(&self) {
        if std::thread::current().id() == self.thread_id {
            return;
        }
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            error!("scheduler thread panicked");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ThreadState {
        self.shared.lock().state
    }

    /// Number of identities still pending (not cancelled, not dispatched).
    pub fn pending_len(&self) -> usize {
        self.shared.lock().queue.pending_len()
    }

    /// Number of heap entries, including cancelled ones not yet reconciled.
    pub fn queued_len(&self) -> usize {
        self.shared.lock().queue.queued_len()
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}

fn run_loop(shared: &Shared, facility: &dyn ExecutionFacility) {
    debug!("scheduler loop running");
    let mut inner = shared.lock();
    while inner.state.is_running() {
        let now = Instant::now();
        let popped = inner.queue.pop_due(now);
        match popped {
            Some(Popped::Live(mut task)) => {
                inner.dispatching = true;
                drop(inner);

                task.set_dont_expire();
                let event_id = task.event_id();
                if catch_unwind(AssertUnwindSafe(|| facility.submit(task, true))).is_err() {
                    error!("execution facility panicked while accepting event {event_id}");
                }

                inner = shared.lock();
                inner.dispatching = false;
                shared.settled.notify_all();
            }
            Some(Popped::Stale(task)) => {
                drop(inner);
                debug!("discarding cancelled event {}", task.event_id());
                drop(task);
                inner = shared.lock();
            }
            None => {
                let next_deadline = inner.queue.next_deadline();
                inner = match next_deadline {
                    None => shared.signal.wait(inner).unwrap_or_else(|e| e.into_inner()),
                    Some(deadline) => {
                        shared
                            .signal
                            .wait_timeout(inner, deadline.saturating_duration_since(now))
                            .unwrap_or_else(|e| e.into_inner())
                            .0
                    }
                };
            }
        }
    }

    let leftover = inner.queue.drain();
    drop(inner);
    if !leftover.is_empty() {
        debug!("scheduler loop dropped {} tasks on exit", leftover.len());
    }
    debug!("scheduler loop stopped");
}
