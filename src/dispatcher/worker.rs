//! Dispatcher worker thread.

use crate::config::DispatcherConfig;
use crate::dispatcher::ExecutionFacility;
use crate::error::{Result, SchedulerError};
use crate::lifecycle::ThreadState;
use crate::scheduler::tasks::ScheduledTask;
use crossbeam_channel::{Receiver, Sender};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

struct Job {
    task: ScheduledTask,
    enqueued_at: Instant,
}

enum Message {
    Run(Job),
    Stop,
}

#[derive(Default)]
struct Shared {
    state: Mutex<ThreadState>,
    executed: AtomicU64,
    expired: AtomicU64,
}

impl Shared {
    fn state(&self) -> ThreadState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// FIFO task runner on a dedicated thread.
pub struct Dispatcher {
    tx: Sender<Message>,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Spawn the worker thread.
    pub fn start(config: &DispatcherConfig) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let expiration = config.task_expiration();

        let worker = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run_worker(&rx, &worker_shared, expiration))
            .map_err(|e| SchedulerError::Thread(format!("cannot spawn dispatcher thread: {e}")))?;

        info!(
            "dispatcher started on thread '{}' (expiry: {:?})",
            config.thread_name, expiration
        );
        Ok(Self {
            tx,
            shared,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queue `body` to run as soon as possible. It is subject to queue expiry.
    pub fn add_task(&self, body: impl FnOnce() + Send + 'static) {
        self.enqueue(ScheduledTask::new(Duration::ZERO, body));
    }

    fn enqueue(&self, task: ScheduledTask) {
        if !self.shared.state().is_running() {
            debug!("dropping task submitted after dispatcher shutdown");
            return;
        }
        let job = Job {
            task,
            enqueued_at: Instant::now(),
        };
        if self.tx.send(Message::Run(job)).is_err() {
            warn!("dispatcher queue closed, dropping task");
        }
    }

    /// Stop accepting work. Queued tasks are dropped unrun.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
            if !state.is_running() {
                return;
            }
            *state = ThreadState::Terminated;
        }
        let _ = self.tx.send(Message::Stop);
    }

    /// Wait for the worker thread to exit.
    pub fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(handle) = handle else {
            return;
        };
        if handle.thread().id() == std::thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            error!("dispatcher thread panicked");
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ThreadState {
        self.shared.state()
    }

    /// Number of task bodies run so far (including ones that panicked).
    pub fn executed_count(&self) -> u64 {
        self.shared.executed.load(Ordering::Acquire)
    }

    /// Number of tasks discarded because they waited past the expiry window.
    pub fn expired_count(&self) -> u64 {
        self.shared.expired.load(Ordering::Acquire)
    }
}

impl ExecutionFacility for Dispatcher {
    fn submit(&self, mut task: ScheduledTask, non_expiring: bool) {
        if non_expiring {
            task.set_dont_expire();
        }
        self.enqueue(task);
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}

fn run_worker(rx: &Receiver<Message>, shared: &Shared, expiration: Option<Duration>) {
    debug!("dispatcher loop running");
    for message in rx {
        let job = match message {
            Message::Run(job) => job,
            Message::Stop => break,
        };
        if !shared.state().is_running() {
            break;
        }

        let waited = job.enqueued_at.elapsed();
        if job.task.expires() && expiration.is_some_and(|limit| waited > limit) {
            debug!(
                "discarding expired task {} after {:?} in queue",
                job.task.event_id(),
                waited
            );
            shared.expired.fetch_add(1, Ordering::AcqRel);
            continue;
        }

        let event_id = job.task.event_id();
        if catch_unwind(AssertUnwindSafe(|| job.task.run())).is_err() {
            warn!("task {event_id} panicked");
        }
        shared.executed.fetch_add(1, Ordering::AcqRel);
    }

    let dropped = rx.try_iter().count();
    if dropped > 0 {
        debug!("dispatcher dropped {dropped} queued tasks on exit");
    }
    debug!("dispatcher loop stopped");
}
