//! Cooperative scheduler over logical time
//!
//! Delays in the engine (status clears, computer replies, premoves) are task
//! records in a min-ordered queue rather than wall-clock timers. Time only
//! moves when the owner calls [`Scheduler::pop_due`] / [`Scheduler::advance_to`],
//! which keeps every test deterministic.
//!
//! # Cancellation
//!
//! Each record carries the session generation it was scheduled under. The
//! scheduler does not interpret it; the reducer drops records whose generation
//! no longer matches the session.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tracing::trace;

/// A task waiting for its fire time
#[derive(Debug, Clone)]
pub struct ScheduledTask<T> {
    pub fire_at: u64,
    pub seq: u64,
    pub generation: u64,
    pub task: T,
}

impl<T> PartialEq for ScheduledTask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl<T> Eq for ScheduledTask<T> {}

impl<T> PartialOrd for ScheduledTask<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledTask<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.fire_at, self.seq).cmp(&(other.fire_at, other.seq))
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<ScheduledTask<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }
}

impl<T: std::fmt::Debug> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time in milliseconds
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Queue `task` to fire `delay_ms` from now; returns its sequence number
    pub fn schedule(&mut self, delay_ms: u64, generation: u64, task: T) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let fire_at = self.now.saturating_add(delay_ms);
        trace!(
            "[SCHEDULER] #{} {:?} at {}ms (gen {})",
            seq,
            task,
            fire_at,
            generation
        );
        self.queue.push(Reverse(ScheduledTask {
            fire_at,
            seq,
            generation,
            task,
        }));
        seq
    }

    /// Remove the earliest task due at or before `deadline`
    ///
    /// The clock moves to the task's fire time, so anything it schedules is
    /// relative to that instant.
    pub fn pop_due(&mut self, deadline: u64) -> Option<ScheduledTask<T>> {
        let due = self
            .queue
            .peek()
            .is_some_and(|Reverse(next)| next.fire_at <= deadline);
        if !due {
            return None;
        }

        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.fire_at);
        Some(entry)
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, time: u64) {
        self.now = self.now.max(time);
    }

    /// Fire time of the earliest queued task
    pub fn next_fire_at(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(next)| next.fire_at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
