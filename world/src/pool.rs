//! Arena of reusable hazards addressed by generation-scoped handles.
//!
//! Slots are created lazily and never dropped while the level lives. Inactive
//! slot indices sit on a free-list; a slot is pushed onto it only on the
//! active-to-inactive transition, so it can never be handed out twice.

use glam::Vec2;
use monster_kong_core::{Generation, HazardHandle, SpriteKey};

use crate::physics::Body;

const HAZARD_BOUNCE: Vec2 = Vec2::new(1.0, 0.1);

/// Rolling hazard whose identity persists across reuse.
#[derive(Clone, Debug)]
pub(crate) struct Hazard {
    pub(crate) body: Body,
    pub(crate) visible: bool,
}

impl Hazard {
    fn new(center: Vec2) -> Self {
        Self {
            body: Body::dynamic(center, SpriteKey::Barrel.frame_size())
                .with_bounce(HAZARD_BOUNCE)
                .with_world_bounds(),
            visible: true,
        }
    }

    fn reactivate(&mut self, center: Vec2) {
        self.body.reset_at(center);
        self.body.enabled = true;
        self.visible = true;
    }
}

#[derive(Clone, Debug)]
struct Slot {
    hazard: Hazard,
    active: bool,
}

/// Pool owning the activation state of every hazard in one generation.
#[derive(Clone, Debug)]
pub(crate) struct HazardPool {
    generation: Generation,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl HazardPool {
    pub(crate) fn new(generation: Generation) -> Self {
        Self {
            generation,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Activates an inactive hazard at `center`, growing the arena when none is free.
    ///
    /// The returned hazard is active, visible, body-enabled and at rest.
    pub(crate) fn acquire(&mut self, center: Vec2) -> HazardHandle {
        while let Some(slot) = self.free.pop() {
            if let Some(entry) = self.slots.get_mut(slot as usize) {
                entry.hazard.reactivate(center);
                entry.active = true;
                return HazardHandle::new(slot, self.generation);
            }
        }

        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            hazard: Hazard::new(center),
            active: true,
        });
        HazardHandle::new(slot, self.generation)
    }

    /// Deactivates and hides the hazard. Its body stays enabled for the caller to clear.
    ///
    /// Returns `false` for stale handles and hazards that are already inactive.
    pub(crate) fn release(&mut self, handle: HazardHandle) -> bool {
        let Some(entry) = self.slot_mut(handle) else {
            return false;
        };
        if !entry.active {
            return false;
        }

        entry.active = false;
        entry.hazard.visible = false;
        self.free.push(handle.slot());
        true
    }

    pub(crate) fn get_mut(&mut self, handle: HazardHandle) -> Option<&mut Hazard> {
        self.slot_mut(handle).map(|entry| &mut entry.hazard)
    }

    /// Every slot, active or not, with the handle that addresses it.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (HazardHandle, &Hazard, bool)> + '_ {
        let generation = self.generation;
        self.slots.iter().enumerate().map(move |(index, entry)| {
            (
                HazardHandle::new(index as u32, generation),
                &entry.hazard,
                entry.active,
            )
        })
    }

    pub(crate) fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Hazard> + '_ {
        self.slots
            .iter_mut()
            .filter(|entry| entry.active)
            .map(|entry| &mut entry.hazard)
    }

    /// Number of hazards ever created in this generation.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn slot_mut(&mut self, handle: HazardHandle) -> Option<&mut Slot> {
        if handle.generation() != self.generation {
            return None;
        }
        self.slots.get_mut(handle.slot() as usize)
    }
}
