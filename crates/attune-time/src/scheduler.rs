//! Delayed event scheduler
//!
//! One-shot events due at a future session time. Every task carries the
//! generation that was current when it was scheduled; `invalidate` moves the
//! scheduler to a new generation and `poll` silently discards anything older.
//! A stale task can therefore never act on reset or ended state.

use attune_core::{Generation, SessionTime, TaskId};
use tracing::trace;

/// A task waiting to fire
#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    id: TaskId,
    due: SessionTime,
    generation: Generation,
    payload: T,
}

/// Cancellable, generation-keyed scheduler
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    /// Current generation
    generation: Generation,
    /// Pending tasks (unordered)
    pending: Vec<ScheduledTask<T>>,
    /// Next task id
    next_id: u64,
    /// Stale tasks discarded so far
    discarded: u64,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at the first generation
    pub fn new() -> Self {
        Scheduler {
            generation: Generation::FIRST,
            pending: Vec::new(),
            next_id: 0,
            discarded: 0,
        }
    }

    /// Schedule `payload` to fire at `due` under the current generation
    pub fn schedule(&mut self, due: SessionTime, payload: T) -> TaskId {
        let id = TaskId::new(self.next_id);
        self.next_id += 1;
        self.pending.push(ScheduledTask {
            id,
            due,
            generation: self.generation,
            payload,
        });
        id
    }

    /// Cancel a pending task. Returns false if it already fired or is unknown.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    /// Move to a new generation. Every task scheduled so far becomes stale.
    pub fn invalidate(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    /// Take every task due at or before `now`, in due order.
    /// Stale tasks are dropped without firing.
    pub fn poll(&mut self, now: SessionTime) -> Vec<T> {
        let generation = self.generation;
        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.pending.len());

        for task in self.pending.drain(..) {
            if task.generation != generation {
                trace!(task = ?task.id, scheduled_in = %task.generation, current = %generation, "discarding stale task");
                self.discarded += 1;
            } else if task.due <= now {
                due.push(task);
            } else {
                remaining.push(task);
            }
        }

        self.pending = remaining;
        due.sort_by_key(|t| (t.due, t.id.0));
        due.into_iter().map(|t| t.payload).collect()
    }

    /// Current generation
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Tasks that would still fire (current generation only)
    pub fn live_len(&self) -> usize {
        self.pending
            .iter()
            .filter(|t| t.generation == self.generation)
            .count()
    }

    /// Stale tasks discarded so far
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
