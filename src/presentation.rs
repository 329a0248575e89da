//! Presentation backend seam
//!
//! The simulation never draws anything. It asks a backend for a sprite when a
//! rider comes into view, pushes position and animation updates while it is
//! visible, and hands the sprite back when the rider leaves view or is
//! removed. Handles are opaque: the simulation only stores and returns them.

use glam::IVec2;

use crate::sim::Personality;

/// Opaque sprite handle issued by a backend
///
/// Deliberately neither `Copy` nor `Clone`: a handle is owned by exactly one
/// rider until it is given back with [`Presentation::release_sprite`].
#[derive(Debug, PartialEq, Eq)]
pub struct SpriteHandle {
    slot: usize,
}

impl SpriteHandle {
    /// Backends mint handles for their own slots
    pub fn new(slot: usize) -> Self {
        Self { slot }
    }

    /// Backend-side slot; the simulation never looks at this
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Sprite backend consumed by the rider simulation
pub trait Presentation {
    /// Allocate a sprite for a rider, or `None` when the backend is exhausted
    fn assign_sprite(&mut self, tag: Personality, position: IVec2) -> Option<SpriteHandle>;

    /// Return a sprite to the backend
    fn release_sprite(&mut self, handle: SpriteHandle);

    /// Move a sprite
    fn move_sprite(&mut self, handle: &SpriteHandle, position: IVec2);

    /// Select an animation frame
    fn set_animation_frame(&mut self, handle: &SpriteHandle, frame: u8);
}

/// Sprite slots available to AI riders (slot 0 belongs to the player bike)
pub const SPRITE_SLOTS: usize = 16;

/// State of one backend slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSlot {
    pub tag: Personality,
    pub position: IVec2,
    pub frame: u8,
}

/// Fixed-capacity in-memory backend
///
/// Used headless (tests, demo runner) and as the reference for what a real
/// renderer has to provide.
#[derive(Debug, Clone)]
pub struct SpritePool {
    slots: [Option<SpriteSlot>; SPRITE_SLOTS],
    capacity: usize,
}

impl Default for SpritePool {
    fn default() -> Self {
        Self::new()
    }
}

impl SpritePool {
    pub fn new() -> Self {
        Self::with_capacity(SPRITE_SLOTS)
    }

    /// Pool limited to `capacity` sprites (clamped to [`SPRITE_SLOTS`])
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: [None; SPRITE_SLOTS],
            capacity: capacity.min(SPRITE_SLOTS),
        }
    }

    pub fn in_use(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn slot(&self, handle: &SpriteHandle) -> Option<&SpriteSlot> {
        self.slots.get(handle.slot()).and_then(Option::as_ref)
    }
}

impl Presentation for SpritePool {
    fn assign_sprite(&mut self, tag: Personality, position: IVec2) -> Option<SpriteHandle> {
        let index = self.slots[..self.capacity].iter().position(Option::is_none)?;
        self.slots[index] = Some(SpriteSlot {
            tag,
            position,
            frame: 0,
        });
        Some(SpriteHandle::new(index))
    }

    fn release_sprite(&mut self, handle: SpriteHandle) {
        if let Some(slot) = self.slots.get_mut(handle.slot()) {
            *slot = None;
        }
    }

    fn move_sprite(&mut self, handle: &SpriteHandle, position: IVec2) {
        if let Some(Some(slot)) = self.slots.get_mut(handle.slot()) {
            slot.position = position;
        }
    }

    fn set_animation_frame(&mut self, handle: &SpriteHandle, frame: u8) {
        if let Some(Some(slot)) = self.slots.get_mut(handle.slot()) {
            slot.frame = frame;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_exhaustion_returns_none() {
        let mut pool = SpritePool::with_capacity(2);
        let a = pool.assign_sprite(Personality::Aggressive, IVec2::ZERO);
        let b = pool.assign_sprite(Personality::Blocker, IVec2::ZERO);
        assert!(a.is_some() && b.is_some());
        assert!(pool.assign_sprite(Personality::Erratic, IVec2::ZERO).is_none());
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn test_release_frees_slot_for_reuse() {
        let mut pool = SpritePool::with_capacity(1);
        let a = pool.assign_sprite(Personality::Defensive, IVec2::new(10, 20)).unwrap();
        pool.release_sprite(a);
        assert_eq!(pool.in_use(), 0);
        let b = pool.assign_sprite(Personality::RubberBand, IVec2::ZERO).unwrap();
        assert_eq!(pool.slot(&b).unwrap().tag, Personality::RubberBand);
    }

    #[test]
    fn test_updates_reach_slot() {
        let mut pool = SpritePool::new();
        let h = pool.assign_sprite(Personality::Aggressive, IVec2::ZERO).unwrap();
        pool.move_sprite(&h, IVec2::new(150, 180));
        pool.set_animation_frame(&h, 3);
        let slot = pool.slot(&h).unwrap();
        assert_eq!(slot.position, IVec2::new(150, 180));
        assert_eq!(slot.frame, 3);
    }
}
