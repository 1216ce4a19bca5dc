//! Scheduled task definition.
//!
//! A [`ScheduledTask`] is a uniquely owned unit of deferred work. It moves
//! into the scheduler on [`add_event`](super::TaskScheduler::add_event), then
//! either into an execution facility on dispatch or out of existence when it
//! is cancelled, rejected or drained at shutdown.

use std::time::{Duration, Instant};

/// Deadline used when `now + delay` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 86_400);

/// Opaque handle identifying a pending task. `0` means "unassigned".
pub type EventId = u32;

/// The callable carried by a task.
pub type TaskBody = Box<dyn FnOnce() + Send + 'static>;

/// Whether an execution facility may discard the task after it has waited
/// too long in its own queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// Subject to the facility's queue expiry.
    #[default]
    Expires,
    /// Must run no matter how long it waits.
    NeverExpires,
}

/// A unit of deferred work.
pub struct ScheduledTask {
    delay: Duration,
    deadline: Option<Instant>,
    event_id: EventId,
    expiry: ExpiryPolicy,
    body: TaskBody,
}

impl ScheduledTask {
    /// Create a task that runs `body` after `delay`, with an identity to be
    /// assigned by the scheduler.
    pub fn new(delay: Duration, body: impl FnOnce() + Send + 'static) -> Self {
        Self {
            delay,
            deadline: None,
            event_id: 0,
            expiry: ExpiryPolicy::Expires,
            body: Box::new(body),
        }
    }

    /// Use a caller-chosen identity instead of an allocated one.
    #[must_use]
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    /// Requested delay from scheduling time.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Absolute deadline, set once the task has been scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Identity of the task (`0` before the scheduler assigns one).
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Current expiry policy.
    pub fn expiry(&self) -> ExpiryPolicy {
        self.expiry
    }

    /// Whether the task is still subject to queue expiry.
    pub fn expires(&self) -> bool {
        self.expiry == ExpiryPolicy::Expires
    }

    /// Exempt the task from queue expiry. Irreversible.
    pub fn set_dont_expire(&mut self) {
        self.expiry = ExpiryPolicy::NeverExpires;
    }

    pub(crate) fn set_event_id(&mut self, event_id: EventId) {
        self.event_id = event_id;
    }

    /// Fix the deadline relative to `now` and return it. Delays too large to
    /// represent saturate to a deadline a century out.
    pub(crate) fn arm(&mut self, now: Instant) -> Instant {
        let deadline = now
            .checked_add(self.delay)
            .unwrap_or_else(|| now + self.delay.min(FAR_FUTURE));
        self.deadline = Some(deadline);
        deadline
    }

    /// Consume the task and run its body.
    pub fn run(self) {
        (self.body)();
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("event_id", &self.event_id)
            .field("delay", &self.delay)
            .field("deadline", &self.deadline)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// Build a task from a millisecond delay.
pub fn create_scheduler_task(delay_ms: u32, body: impl FnOnce() + Send + 'static) -> ScheduledTask {
    ScheduledTask::new(Duration::from_millis(u64::from(delay_ms)), body)
}
