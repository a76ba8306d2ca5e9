//! The global simulated clock and event queue.
//!
//! Entries are ordered by `(time, sequence)`: equal timestamps pop in the
//! order they were pushed. Actor timers arrive through the [`Scheduler`]
//! seam; the driver pushes its own decision and regeneration events directly.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rogue_core::{ActorId, Scheduler, SimEvent, Tick};

/// What a queue entry asks the driver to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueEvent {
    /// A timer one of the actors armed.
    Actor(SimEvent),
    /// The actor should pick its next ability.
    Decision(ActorId),
    /// Periodic energy regeneration for every actor.
    Regen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    at: Tick,
    seq: u64,
    event: QueueEvent,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse for earliest-first
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    now: Tick,
    seq: u64,
    heap: BinaryHeap<Entry>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `event` to fire `delay` after the current time.
    pub fn push(&mut self, delay: Tick, event: QueueEvent) {
        let entry = Entry {
            at: self.now + delay,
            seq: self.seq,
            event,
        };
        self.seq += 1;
        self.heap.push(entry);
    }

    /// Removes the earliest entry and advances the clock to it.
    pub fn pop(&mut self) -> Option<(Tick, QueueEvent)> {
        let entry = self.heap.pop()?;
        self.now = self.now.max(entry.at);
        Some((entry.at, entry.event))
    }

    pub fn peek_time(&self) -> Option<Tick> {
        self.heap.peek().map(|entry| entry.at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drops every entry and rewinds the clock for a new iteration.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.now = Tick::ZERO;
        self.seq = 0;
    }
}

impl Scheduler for EventQueue {
    fn now(&self) -> Tick {
        self.now
    }

    fn schedule(&mut self, delay: Tick, event: SimEvent) {
        self.push(delay, QueueEvent::Actor(event));
    }
}
