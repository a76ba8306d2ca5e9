//! Generation-checked timer slots.
//!
//! Every per-actor timed callback (a dot tick, a buff expiry, a delayed impact,
//! a swing) owns one slot in the arena. The external scheduler only ever sees
//! the small [`TimerHandle`]; when the event fires the actor redeems the handle
//! with [`TimerArena::fire`]. Cancelling, firing and clearing all bump the
//! slot generation, so an event that outlived its slot resolves to `None` and
//! is ignored instead of touching a discarded instance.

use crate::action::{AbilityKind, CastState};
use crate::state::{ActorId, BuffKind, BuffScope};
use crate::stats::WeaponSlot;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    index: u32,
    generation: u32,
}

impl TimerHandle {
    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// What a timer does when it fires.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerPurpose {
    /// A travelling cast lands on its target.
    Impact(Box<CastState>),
    DotTick {
        target: ActorId,
        ability: AbilityKind,
    },
    BuffExpire {
        scope: BuffScope,
        kind: BuffKind,
    },
    Swing(WeaponSlot),
    VirtualHonorAmongThieves,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    purpose: Option<TimerPurpose>,
}

#[derive(Clone, Debug, Default)]
pub struct TimerArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl TimerArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot for `purpose` and returns its handle, or `None` once
    /// every `u32` index is taken.
    pub fn arm(&mut self, purpose: TimerPurpose) -> Option<TimerHandle> {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len()).ok()?;
                self.slots.push(Slot::default());
                index
            }
        };
        let slot = self.slots.get_mut(index as usize)?;
        slot.purpose = Some(purpose);
        Some(TimerHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Releases the slot behind `handle`. Returns false for stale handles.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.release(handle).is_some()
    }

    /// Redeems a fired handle, returning its purpose if it is still live.
    pub fn fire(&mut self, handle: TimerHandle) -> Option<TimerPurpose> {
        self.release(handle)
    }

    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.generation == handle.generation && slot.purpose.is_some())
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.purpose.is_some()).count()
    }

    /// Invalidates every outstanding handle.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in (0..).zip(self.slots.iter_mut()) {
            slot.generation = slot.generation.wrapping_add(1);
            slot.purpose = None;
            self.free.push(index);
        }
    }

    fn release(&mut self, handle: TimerHandle) -> Option<TimerPurpose> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let purpose = slot.purpose.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(purpose)
    }
}
