//! Deadline-ordered event queue with a lazy cancellation index.
//!
//! The heap owns every scheduled task. The pending set records which
//! identities are still live; cancelling only removes from the set, and the
//! stale heap entry is discarded when it reaches the top.

use super::tasks::{EventId, ScheduledTask};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;

struct Entry {
    deadline: Instant,
    seq: u64,
    task: ScheduledTask,
}

// `BinaryHeap` is a max-heap: invert so the earliest deadline (then the
// lowest insertion sequence) sits on top.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Outcome of [`EventQueue::insert`].
pub(crate) enum Insertion {
    /// Queued under `event_id`; `earliest` when it became the new minimum.
    Queued { event_id: EventId, earliest: bool },
    /// The caller-chosen identity is already pending; the task is handed back.
    Duplicate(ScheduledTask),
}

/// A task taken off the top of the heap.
pub(crate) enum Popped {
    /// Still pending; its identity has been removed from the index.
    Live(ScheduledTask),
    /// Cancelled while queued.
    Stale(ScheduledTask),
}

#[derive(Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Entry>,
    pending: HashSet<EventId>,
    last_event_id: EventId,
    next_seq: u64,
}

impl EventQueue {
    /// Next identity from the wrapping counter, never `0` and never one
    /// that is still pending (caller-chosen identities share the space).
    fn allocate_id(&mut self) -> EventId {
        loop {
            self.last_event_id = self.last_event_id.wrapping_add(1);
            if self.last_event_id != 0 && !self.pending.contains(&self.last_event_id) {
                return self.last_event_id;
            }
        }
    }

    pub(crate) fn insert(&mut self, mut task: ScheduledTask, now: Instant) -> Insertion {
        if task.event_id() == 0 {
            let event_id = self.allocate_id();
            task.set_event_id(event_id);
        } else if self.pending.contains(&task.event_id()) {
            return Insertion::Duplicate(task);
        }

        let event_id = task.event_id();
        let deadline = task.arm(now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        self.pending.insert(event_id);
        self.heap.push(Entry {
            deadline,
            seq,
            task,
        });

        let earliest = self.heap.peek().is_some_and(|top| top.seq == seq);
        Insertion::Queued { event_id, earliest }
    }

    pub(crate) fn cancel(&mut self, event_id: EventId) -> bool {
        self.pending.remove(&event_id)
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|entry| entry.deadline)
    }

    /// Pop the minimum if its deadline is at or before `now`.
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<Popped> {
        if self.next_deadline()? > now {
            return None;
        }
        let entry = self.heap.pop()?;
        if self.pending.remove(&entry.task.event_id()) {
            Some(Popped::Live(entry.task))
        } else {
            Some(Popped::Stale(entry.task))
        }
    }

    /// Remove every queued task, live or stale, and clear the index.
    pub(crate) fn drain(&mut self) -> Vec<ScheduledTask> {
        self.pending.clear();
        std::mem::take(&mut self.heap)
            .into_iter()
            .map(|entry| entry.task)
            .collect()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn queued_len(&self) -> usize {
        self.heap.len()
    }
}
