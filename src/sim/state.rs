//! Rider records and the fixed-capacity rider pool
//!
//! The pool is an index-addressed arena: eight rider slots plus an update
//! order. Disabling a rider only clears its flags; the slot is reused by the
//! next spawn that scans for a free index. Nothing here allocates.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::fixed::Fx16;
use super::random::RandomSource;
use crate::consts::*;
use crate::presentation::{Presentation, SpriteHandle};

/// Rider personality, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Hunts the player and swings at them
    Aggressive,
    /// Keeps clear of the player
    Defensive,
    /// Random lines, opportunistic attacks
    Erratic,
    /// Holds station relative to the player on the track
    RubberBand,
    /// Sits in the player's lane and holds them up
    Blocker,
}

/// Base stats applied at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub max_speed: i16,
    pub acceleration: i16,
    pub handling: u8,
    pub rubber_band_strength: i16,
    pub aggression: u8,
}

const fn profile(max_speed: i16, acceleration: i16, handling: u8, rubber: i16, aggression: u8) -> Profile {
    Profile {
        max_speed,
        acceleration,
        handling,
        rubber_band_strength: rubber,
        aggression,
    }
}

/// Indexed by `Personality as usize`
const PROFILES: [Profile; 5] = [
    profile(240, 4, 180, 50, 200),  // Aggressive
    profile(200, 3, 220, 80, 80),   // Defensive
    profile(220, 5, 140, 30, 150),  // Erratic
    profile(210, 3, 200, 180, 100), // RubberBand
    profile(180, 2, 160, 60, 250),  // Blocker
];

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Aggressive,
        Personality::Defensive,
        Personality::Erratic,
        Personality::RubberBand,
        Personality::Blocker,
    ];

    #[inline]
    pub fn profile(self) -> &'static Profile {
        &PROFILES[self as usize]
    }
}

/// Behavioral state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RiderState {
    #[default]
    Racing,
    Attacking,
    Avoiding,
    Crashed,
    CatchingUp,
}

/// One simulated competitor
#[derive(Debug, PartialEq)]
pub struct Rider {
    /// Screen-space position
    pub screen: IVec2,
    /// Lateral world position
    pub world_x: Fx16,
    /// Longitudinal world position
    pub world_z: Fx16,

    pub speed: i16,
    pub max_speed: i16,
    /// Speed the integrator accelerates toward
    pub cruise_speed: i16,
    pub acceleration: i16,
    pub handling: u8,

    pub personality: Personality,
    pub state: RiderState,
    pub state_timer: u16,
    pub target_x: i32,
    pub decision_timer: i16,

    pub rubber_band_strength: i16,
    /// Lateral distance to the player at the last decision
    pub player_distance: i32,
    pub aggression: u8,

    pub sprite: Option<SpriteHandle>,
    pub anim_frame: u8,
    pub anim_timer: u8,
    pub visible: bool,
    pub active: bool,
    /// Far enough away to update on alternate frames
    pub throttled: bool,

    pub attack_cooldown: u16,
    pub health: i16,
    pub can_attack: bool,
}

impl Rider {
    /// An empty slot
    pub fn vacant() -> Self {
        Self {
            screen: IVec2::ZERO,
            world_x: Fx16::ZERO,
            world_z: Fx16::ZERO,
            speed: 0,
            max_speed: 0,
            cruise_speed: 0,
            acceleration: 0,
            handling: 0,
            personality: Personality::Aggressive,
            state: RiderState::Racing,
            state_timer: 0,
            target_x: ROAD_CENTER,
            decision_timer: 0,
            rubber_band_strength: 0,
            player_distance: 0,
            aggression: 0,
            sprite: None,
            anim_frame: 0,
            anim_timer: 0,
            visible: false,
            active: false,
            throttled: false,
            attack_cooldown: 0,
            health: 0,
            can_attack: false,
        }
    }

    /// Lateral screen position
    #[inline]
    pub fn x(&self) -> i32 {
        self.screen.x
    }

    /// Switch state and arm its timer
    #[inline]
    pub fn enter(&mut self, state: RiderState, frames: u16) {
        self.state = state;
        self.state_timer = frames;
    }

    /// Apply damage, saturating at zero. Returns true when the rider is out.
    #[inline]
    pub fn damage(&mut self, amount: i16) -> bool {
        self.health = self.health.saturating_sub(amount).clamp(0, MAX_HEALTH);
        self.health == 0
    }

    #[inline]
    pub fn heal(&mut self, amount: i16) {
        self.health = self.health.saturating_add(amount).clamp(0, MAX_HEALTH);
    }

    /// Lower speed, never below zero
    #[inline]
    pub fn slow_down(&mut self, amount: i16) {
        self.speed = self.speed.saturating_sub(amount).max(0);
    }

    /// A freshly spawned rider with its personality's stat profile
    pub fn new(personality: Personality, world_z: Fx16, lane_x: i32) -> Self {
        let p = personality.profile();
        Self {
            screen: IVec2::new(lane_x, HORIZON_Y),
            world_x: Fx16::from_units(i64::from(lane_x)),
            world_z,
            speed: p.max_speed >> 1,
            max_speed: p.max_speed,
            cruise_speed: p.max_speed,
            acceleration: p.acceleration,
            handling: p.handling,
            personality,
            state: RiderState::Racing,
            state_timer: 0,
            target_x: lane_x,
            decision_timer: 0,
            rubber_band_strength: p.rubber_band_strength,
            player_distance: 0,
            aggression: p.aggression,
            sprite: None,
            anim_frame: 0,
            anim_timer: 0,
            visible: false,
            active: true,
            throttled: false,
            attack_cooldown: 0,
            health: MAX_HEALTH,
            can_attack: true,
        }
    }
}

/// Stable handle to a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RiderId(pub(crate) usize);

impl RiderId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Snapshot of the update order
#[derive(Debug, Clone, Copy)]
pub struct UpdateOrder {
    ids: [RiderId; MAX_RIDERS],
    len: usize,
}

impl UpdateOrder {
    /// `(rank, id)` pairs, nearest rider first
    pub fn iter(&self) -> impl Iterator<Item = (usize, RiderId)> + '_ {
        self.ids[..self.len].iter().copied().enumerate()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed-capacity rider arena
#[derive(Debug)]
pub struct RiderPool {
    riders: [Rider; MAX_RIDERS],
    active_count: usize,
    /// Slot indices, nearest rider first after each performance pass
    order: [usize; MAX_RIDERS],
}

impl Default for RiderPool {
    fn default() -> Self {
        Self::new()
    }
}

impl RiderPool {
    pub fn new() -> Self {
        Self {
            riders: std::array::from_fn(|_| Rider::vacant()),
            active_count: 0,
            order: std::array::from_fn(|i| i),
        }
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.active_count >= MAX_RIDERS
    }

    /// Spawn into the first free slot. No-op when the pool is full.
    pub fn spawn<R: RandomSource>(
        &mut self,
        personality: Personality,
        world_z: Fx16,
        lane_x: i32,
        rng: &mut R,
    ) -> Option<RiderId> {
        if self.is_full() {
            return None;
        }
        let index = self.riders.iter().position(|r| !r.active)?;
        let jitter = rng.below(DECISION_INTERVAL as u16) as i16;
        self.riders[index] = Rider::new(personality, world_z, lane_x);
        self.riders[index].decision_timer = jitter;
        self.active_count += 1;
        log::debug!(
            "Spawned {:?} in slot {} at z={} x={}",
            personality,
            index,
            world_z.units(),
            lane_x
        );
        Some(RiderId(index))
    }

    /// Release the rider's sprite and free its slot
    pub fn disable<P: Presentation>(&mut self, id: RiderId, backend: &mut P) {
        let Some(rider) = self.riders.get_mut(id.0) else {
            return;
        };
        if !rider.active {
            return;
        }
        if let Some(handle) = rider.sprite.take() {
            backend.release_sprite(handle);
        }
        rider.active = false;
        rider.visible = false;
        rider.throttled = false;
        self.active_count -= 1;
    }

    /// Disable every active rider
    pub fn clear<P: Presentation>(&mut self, backend: &mut P) {
        for index in 0..MAX_RIDERS {
            self.disable(RiderId(index), backend);
        }
        self.order = std::array::from_fn(|i| i);
    }

    /// Active rider by handle
    #[inline]
    pub fn get(&self, id: RiderId) -> Option<&Rider> {
        self.riders.get(id.0).filter(|r| r.active)
    }

    #[inline]
    pub fn get_mut(&mut self, id: RiderId) -> Option<&mut Rider> {
        self.riders.get_mut(id.0).filter(|r| r.active)
    }

    /// Two distinct active riders at once
    pub fn pair_mut(&mut self, a: RiderId, b: RiderId) -> Option<(&mut Rider, &mut Rider)> {
        if a.0 == b.0 || a.0 >= MAX_RIDERS || b.0 >= MAX_RIDERS {
            return None;
        }
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (left, right) = self.riders.split_at_mut(hi);
        let (first, second) = (&mut left[lo], &mut right[0]);
        if !first.active || !second.active {
            return None;
        }
        if a.0 < b.0 {
            Some((first, second))
        } else {
            Some((second, first))
        }
    }

    /// Active riders in update order, with their rank in that order
    pub fn ranked_ids(&self) -> impl Iterator<Item = (usize, RiderId)> + '_ {
        self.order
            .iter()
            .filter(|&&i| self.riders[i].active)
            .enumerate()
            .map(|(rank, &i)| (rank, RiderId(i)))
    }

    /// Active riders in update order
    pub fn ids(&self) -> impl Iterator<Item = RiderId> + '_ {
        self.ranked_ids().map(|(_, id)| id)
    }

    /// Copy of the current update order, for walking while mutating the pool
    pub fn update_order(&self) -> UpdateOrder {
        let mut order = UpdateOrder {
            ids: [RiderId(0); MAX_RIDERS],
            len: 0,
        };
        for (rank, id) in self.ranked_ids() {
            order.ids[rank] = id;
            order.len = rank + 1;
        }
        order
    }

    /// Active riders in slot order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (RiderId, &mut Rider)> + '_ {
        self.riders
            .iter_mut()
            .enumerate()
            .filter(|(_, r)| r.active)
            .map(|(i, r)| (RiderId(i), r))
    }

    /// Active riders in slot order
    pub fn iter(&self) -> impl Iterator<Item = (RiderId, &Rider)> + '_ {
        self.riders
            .iter()
            .enumerate()
            .filter(|(_, r)| r.active)
            .map(|(i, r)| (RiderId(i), r))
    }

    /// Reorder updates nearest-first relative to `player_z`
    ///
    /// Inactive slots sink to the end. Stable, so ties keep slot order.
    pub fn sort_by_distance(&mut self, player_z: Fx16) {
        let riders = &self.riders;
        self.order.sort_by_key(|&i| {
            let r = &riders[i];
            (!r.active, (r.world_z - player_z).abs())
        });
    }

    /// Count of active flags; equals `active_count` at all times
    pub fn count_active_slots(&self) -> usize {
        self.riders.iter().filter(|r| r.active).count()
    }
}

/// Frame-scoped diagnostics; never feed back into the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiStats {
    pub updates_performed: u16,
    pub collisions_checked: u16,
    pub visible_riders: u16,
    pub total_spawned: u32,
}

impl AiStats {
    /// Clear the per-frame counters
    pub fn begin_frame(&mut self) {
        self.updates_performed = 0;
        self.collisions_checked = 0;
        self.visible_riders = 0;
    }
}
