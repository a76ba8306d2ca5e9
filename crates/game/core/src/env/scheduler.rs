//! Event scheduling seam.

use crate::state::{ActorId, Tick, TimerHandle};

/// A timed callback addressed to one actor's timer slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SimEvent {
    pub actor: ActorId,
    pub timer: TimerHandle,
}

/// The global simulated clock and event queue.
///
/// Events scheduled for the same timestamp must be delivered in the order they
/// were scheduled. There is no removal: a cancelled timer is left in the queue
/// and dropped by the actor when its handle no longer redeems.
pub trait Scheduler {
    fn now(&self) -> Tick;

    fn schedule(&mut self, delay: Tick, event: SimEvent);
}
