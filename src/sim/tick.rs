//! Fixed-step AI frame
//!
//! `AiSystem` owns everything the rider AI keeps between frames: the pool,
//! the spawner, difficulty and performance bookkeeping, statistics and
//! tuning. Independent instances never share state.
//!
//! Per-frame order is fixed: difficulty, spawning, per-rider decision and
//! physics, collisions, performance pass, visibility. Collisions run only
//! once every rider has moved for the frame.

use super::collision::{
    PlayerCollision, StrikeOutcome, close_interaction, player_screen, resolve_player_collision,
    resolve_rider_collision, strike_rider,
};
use super::decision;
use super::difficulty::Difficulty;
use super::fixed::Fx16;
use super::performance::{PerformanceManager, should_update};
use super::physics;
use super::random::RandomSource;
use super::spawn::{LevelType, Spawner};
use super::state::{AiStats, Personality, Rider, RiderId, RiderPool};
use super::world::World;
use crate::consts::*;
use crate::error::AiError;
use crate::persistence::SaveState;
use crate::presentation::Presentation;
use crate::tuning::Tuning;
use crate::within;

/// The rider AI subsystem
#[derive(Debug)]
pub struct AiSystem {
    pool: RiderPool,
    spawner: Spawner,
    difficulty: Difficulty,
    performance: PerformanceManager,
    stats: AiStats,
    tuning: Tuning,
    frame: u32,
    level: LevelType,
}

impl Default for AiSystem {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl AiSystem {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            pool: RiderPool::new(),
            spawner: Spawner::default(),
            difficulty: Difficulty::default(),
            performance: PerformanceManager::new(),
            stats: AiStats::default(),
            tuning,
            frame: 0,
            level: LevelType::default(),
        }
    }

    /// Start a level: select its spawn table, reset difficulty and state,
    /// then spawn the opening batch ahead of the player
    pub fn initialize<R: RandomSource, P: Presentation>(
        &mut self,
        level: LevelType,
        world: &mut World<R>,
        backend: &mut P,
    ) {
        self.reset(backend);
        self.level = level;
        self.spawner.select(level);
        self.difficulty = Difficulty::new(level.base_difficulty());
        self.spawner.spawn_initial(
            &mut self.pool,
            &world.player,
            self.difficulty.level(),
            &mut world.rng,
            &mut self.stats,
        );
        log::info!(
            "AI initialized for {:?} at difficulty {} with {} riders",
            level,
            self.difficulty.level(),
            self.pool.active_count()
        );
    }

    /// Deactivate every rider and zero difficulty, timers and statistics
    pub fn reset<P: Presentation>(&mut self, backend: &mut P) {
        self.pool.clear(backend);
        self.spawner.reset();
        self.difficulty = Difficulty::default();
        self.performance.reset();
        self.stats = AiStats::default();
        self.frame = 0;
        log::info!("AI reset");
    }

    /// Run one full frame
    pub fn tick<R: RandomSource, P: Presentation>(
        &mut self,
        world: &mut World<R>,
        backend: &mut P,
        road_curve: i16,
    ) {
        self.frame = self.frame.wrapping_add(1);
        self.stats.begin_frame();

        // Escalate first so this frame's spawn ceiling sees the new level
        self.difficulty.update(&mut self.pool);
        self.spawner.update(
            self.frame,
            &mut self.pool,
            &world.player,
            self.difficulty.level(),
            &mut world.rng,
            &mut self.stats,
        );

        let player_z = world.player.world_z();
        for (rank, id) in self.pool.update_order().iter() {
            let Some(rider) = self.pool.get_mut(id) else {
                continue;
            };
            if !should_update(rider.throttled, rank, self.frame) {
                continue;
            }
            decision::update(rider, &mut world.player, &self.tuning, &mut world.rng);
            physics::advance(rider, road_curve, player_z);
            self.stats.updates_performed += 1;
        }

        self.resolve_collisions(world, backend);
        self.performance
            .update(&mut self.pool, player_z, &self.tuning, backend);
        self.update_visibility(player_z, backend);

        log::trace!(
            "frame {}: {} active, {} updated, {} visible, {} collision checks",
            self.frame,
            self.pool.active_count(),
            self.stats.updates_performed,
            self.stats.visible_riders,
            self.stats.collisions_checked
        );
    }

    /// Player interactions, then rider pile-ups. Only visible riders take part.
    fn resolve_collisions<R, P: Presentation>(&mut self, world: &mut World<R>, backend: &mut P) {
        let player = &mut world.player;

        for (_, id) in self.pool.update_order().iter() {
            let Some(rider) = self.pool.get_mut(id) else {
                continue;
            };
            if !rider.visible {
                continue;
            }

            if (rider.x() - player.x).abs() < self.tuning.close_interaction_radius {
                close_interaction(rider, player, &self.tuning);
            }

            self.stats.collisions_checked += 1;
            if !within(
                rider.screen,
                player_screen(player),
                self.tuning.player_collision_threshold,
            ) {
                continue;
            }
            if let PlayerCollision::RiderCrashed { knocked_out: true } =
                resolve_player_collision(rider, player)
            {
                log::debug!("Rider in slot {} knocked out by collision", id.index());
                self.pool.disable(id, backend);
            }
        }

        let order = self.pool.update_order();
        for (i, a) in order.iter() {
            for (_, b) in order.iter().skip(i + 1) {
                let Some((ra, rb)) = self.pool.pair_mut(a, b) else {
                    continue;
                };
                if !ra.visible || !rb.visible {
                    continue;
                }
                self.stats.collisions_checked += 1;
                if within(ra.screen, rb.screen, self.tuning.rider_collision_threshold) {
                    resolve_rider_collision(ra, rb);
                }
            }
        }
    }

    /// Hand sprites out to riders in range and take them back from the rest
    fn update_visibility<P: Presentation>(&mut self, player_z: Fx16, backend: &mut P) {
        let range = self.tuning.visibility_distance;

        for (id, rider) in self.pool.iter_mut() {
            if (rider.world_z - player_z).abs().units() >= range {
                if let Some(handle) = rider.sprite.take() {
                    backend.release_sprite(handle);
                }
                rider.visible = false;
                continue;
            }

            if rider.sprite.is_none() {
                rider.sprite = backend.assign_sprite(rider.personality, rider.screen);
                if rider.sprite.is_none() {
                    log::debug!("No sprite for rider in slot {}, staying hidden", id.index());
                }
            }

            let Some(handle) = &rider.sprite else {
                rider.visible = false;
                continue;
            };
            rider.visible = true;
            backend.move_sprite(handle, rider.screen);

            rider.anim_timer += 1;
            if rider.anim_timer >= ANIM_FRAME_TICKS {
                rider.anim_timer = 0;
                rider.anim_frame = (rider.anim_frame + 1) % ANIM_FRAMES;
                backend.set_animation_frame(handle, rider.anim_frame);
            }
            self.stats.visible_riders += 1;
        }
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Nearest active, visible rider by lateral distance to `player_x`
    pub fn get_nearest(&self, player_x: i32) -> Option<RiderId> {
        self.pool
            .iter()
            .filter(|(_, r)| r.visible)
            .min_by_key(|(_, r)| (r.x() - player_x).abs())
            .map(|(id, _)| id)
    }

    /// Player strike on a rider. `None` when the handle no longer refers to
    /// an active rider.
    pub fn apply_external_attack<P: Presentation>(
        &mut self,
        id: RiderId,
        damage: i16,
        backend: &mut P,
    ) -> Option<StrikeOutcome> {
        let rider = self.pool.get_mut(id)?;
        let outcome = strike_rider(rider, damage);
        if outcome == StrikeOutcome::Knockout {
            log::debug!("Rider in slot {} knocked out by player", id.index());
            self.pool.disable(id, backend);
        }
        Some(outcome)
    }

    /// Track segment event: an aggressive rider just ahead of the player
    pub fn spawn_event_rider<R: RandomSource>(
        &mut self,
        lane_offset: i32,
        world: &mut World<R>,
    ) -> Option<RiderId> {
        let z = world.player.world_z() + Fx16::from_units(EVENT_SPAWN_AHEAD);
        let id = self.pool.spawn(
            Personality::Aggressive,
            z,
            EVENT_SPAWN_LANE + lane_offset,
            &mut world.rng,
        )?;
        self.stats.total_spawned += 1;
        Some(id)
    }

    /// Minimal snapshot for save/resume
    pub fn save_state<R>(&self, world: &World<R>) -> SaveState {
        SaveState {
            active_riders: self.pool.active_count() as u8,
            difficulty_level: self.difficulty.level(),
            track_position: world.player.track_position,
            frame_counter: self.frame,
        }
    }

    /// Resume from a snapshot
    ///
    /// Rider records are not part of the snapshot; the current level's
    /// opening batch is spawned at the restored track position instead.
    pub fn restore_state<R: RandomSource, P: Presentation>(
        &mut self,
        snapshot: &SaveState,
        world: &mut World<R>,
        backend: &mut P,
    ) -> Result<(), AiError> {
        snapshot.validate()?;

        self.pool.clear(backend);
        self.spawner.reset();
        self.performance.reset();
        self.stats = AiStats::default();
        self.difficulty = Difficulty::new(snapshot.difficulty_level);
        self.frame = snapshot.frame_counter;
        world.player.track_position = snapshot.track_position;

        self.spawner.spawn_initial(
            &mut self.pool,
            &world.player,
            self.difficulty.level(),
            &mut world.rng,
            &mut self.stats,
        );
        log::info!(
            "AI restored at frame {} (difficulty {}, {} riders regenerated)",
            self.frame,
            self.difficulty.level(),
            self.pool.active_count()
        );
        Ok(())
    }

    pub fn rider(&self, id: RiderId) -> Option<&Rider> {
        self.pool.get(id)
    }

    /// Active riders in slot order
    pub fn riders(&self) -> impl Iterator<Item = (RiderId, &Rider)> + '_ {
        self.pool.iter()
    }

    pub fn stats(&self) -> &AiStats {
        &self.stats
    }

    pub fn difficulty(&self) -> u8 {
        self.difficulty.level()
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn level(&self) -> LevelType {
        self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::SpritePool;
    use crate::sim::random::FixedRng;
    use crate::sim::state::RiderState;
    use crate::sim::world::Player;
    use proptest::prelude::*;
    use rand_pcg::Pcg32;

    fn setup(seed: u64, level: LevelType) -> (AiSystem, World<Pcg32>, SpritePool) {
        let mut ai = AiSystem::default();
        let mut world = World::seeded(seed);
        world.player.speed = 150;
        let mut backend = SpritePool::new();
        ai.initialize(level, &mut world, &mut backend);
        (ai, world, backend)
    }

    /// Player drives at constant speed down a gently winding road
    fn drive(ai: &mut AiSystem, world: &mut World<Pcg32>, backend: &mut SpritePool, frames: u32) {
        for _ in 0..frames {
            world.player.track_position += i64::from(world.player.speed >> 6);
            let curve = ((ai.frame() / 90) % 5) as i16 * 8 - 16;
            ai.tick(world, backend, curve);
        }
    }

    #[test]
    fn test_initialize_spawns_opening_batch() {
        let (ai, _, _) = setup(1, LevelType::City);
        assert_eq!(ai.active_count(), 2);
        assert_eq!(ai.difficulty(), 1);
        assert_eq!(ai.stats().total_spawned, 2);

        let (ai, _, _) = setup(1, LevelType::Mountain);
        assert_eq!(ai.difficulty(), 3);
        assert_eq!(ai.active_count(), 3);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut ai, mut world, mut backend) = setup(2, LevelType::Highway);
        drive(&mut ai, &mut world, &mut backend, 120);
        ai.reset(&mut backend);
        assert_eq!(ai.active_count(), 0);
        assert_eq!(ai.frame(), 0);
        assert_eq!(ai.difficulty(), 1);
        assert_eq!(*ai.stats(), AiStats::default());
        assert_eq!(backend.in_use(), 0);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let (mut a, mut wa, mut ba) = setup(77, LevelType::Highway);
        let (mut b, mut wb, mut bb) = setup(77, LevelType::Highway);
        drive(&mut a, &mut wa, &mut ba, 900);
        drive(&mut b, &mut wb, &mut bb, 900);

        assert_eq!(wa.player, wb.player);
        assert_eq!(a.save_state(&wa), b.save_state(&wb));
        let ra: Vec<_> = a.riders().collect();
        let rb: Vec<_> = b.riders().collect();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_visible_riders_get_sprites() {
        let (mut ai, mut world, mut backend) = setup(3, LevelType::City);
        ai.tick(&mut world, &mut backend, 0);
        // Opening batch sits 200 and 350 units ahead: both in range
        assert_eq!(ai.stats().visible_riders, 2);
        assert_eq!(backend.in_use(), 2);
        for (_, r) in ai.riders() {
            assert!(r.visible && r.sprite.is_some());
        }
    }

    #[test]
    fn test_sprite_exhaustion_leaves_rider_hidden() {
        let mut ai = AiSystem::default();
        let mut world = World::seeded(4);
        let mut backend = SpritePool::with_capacity(1);
        ai.initialize(LevelType::City, &mut world, &mut backend);
        ai.tick(&mut world, &mut backend, 0);
        assert_eq!(ai.active_count(), 2);
        assert_eq!(ai.stats().visible_riders, 1);
        let hidden: Vec<_> = ai.riders().filter(|(_, r)| !r.visible).collect();
        assert_eq!(hidden.len(), 1);
        assert!(hidden[0].1.sprite.is_none());

        // Once the visible rider is gone the hidden one picks up its sprite
        let visible = ai.riders().find(|(_, r)| r.visible).map(|(id, _)| id).unwrap();
        ai.pool.disable(visible, &mut backend);
        ai.tick(&mut world, &mut backend, 0);
        assert_eq!(ai.stats().visible_riders, 1);
    }

    #[test]
    fn test_leaving_range_releases_sprite() {
        let (mut ai, mut world, mut backend) = setup(5, LevelType::City);
        ai.tick(&mut world, &mut backend, 0);
        assert_eq!(backend.in_use(), 2);
        // Player jumps far ahead: riders drop out of view
        world.player.track_position += 2000;
        ai.tick(&mut world, &mut backend, 0);
        assert_eq!(backend.in_use(), 0);
        assert!(ai.riders().all(|(_, r)| !r.visible && r.sprite.is_none()));
    }

    #[test]
    fn test_animation_advances_every_eight_frames() {
        let (mut ai, mut world, mut backend) = setup(6, LevelType::City);
        for _ in 0..ANIM_FRAME_TICKS {
            ai.tick(&mut world, &mut backend, 0);
        }
        for (_, r) in ai.riders() {
            assert_eq!(r.anim_frame, 1);
            let handle = r.sprite.as_ref().unwrap();
            assert_eq!(backend.slot(handle).unwrap().frame, 1);
            assert_eq!(backend.slot(handle).unwrap().position, r.screen);
        }
    }

    #[test]
    fn test_get_nearest_prefers_visible() {
        let (mut ai, mut world, mut backend) = setup(7, LevelType::City);
        assert_eq!(ai.get_nearest(160), None);
        ai.tick(&mut world, &mut backend, 0);
        let nearest = ai.get_nearest(200).unwrap();
        let best = ai.rider(nearest).unwrap().x();
        assert!(ai.riders().all(|(_, r)| (r.x() - 200).abs() >= (best - 200).abs()));
    }

    #[test]
    fn test_external_attack_and_knockout() {
        let (mut ai, mut world, mut backend) = setup(8, LevelType::City);
        ai.tick(&mut world, &mut backend, 0);
        let id = ai.get_nearest(160).unwrap();

        assert_eq!(ai.apply_external_attack(id, 25, &mut backend), Some(StrikeOutcome::Hit));
        let r = ai.rider(id).unwrap();
        assert_eq!(r.state, RiderState::Crashed);
        assert_eq!(r.state_timer, STRIKE_CRASH_FRAMES);
        assert_eq!(r.health, 75);

        for _ in 0..2 {
            ai.apply_external_attack(id, 25, &mut backend);
        }
        assert_eq!(
            ai.apply_external_attack(id, 25, &mut backend),
            Some(StrikeOutcome::Knockout)
        );
        assert!(ai.rider(id).is_none());
        assert_eq!(ai.active_count(), 1);
        assert_eq!(backend.in_use(), 1);

        // Stale handle
        assert_eq!(ai.apply_external_attack(id, 25, &mut backend), None);
    }

    #[test]
    fn test_event_rider_spawns_ahead() {
        let mut ai = AiSystem::default();
        let mut world = World::new(
            Player {
                track_position: 1000,
                ..Default::default()
            },
            FixedRng(0),
        );
        let id = ai.spawn_event_rider(-10, &mut world).unwrap();
        let r = ai.rider(id).unwrap();
        assert_eq!(r.personality, Personality::Aggressive);
        assert_eq!(r.world_z, Fx16::from_units(1200));
        assert_eq!(r.x(), 130);
        assert_eq!(ai.stats().total_spawned, 1);
    }

    #[test]
    fn test_difficulty_escalates_through_tick() {
        let (mut ai, mut world, mut backend) = setup(9, LevelType::City);
        world.player.speed = 0;
        for _ in 0..DIFFICULTY_INTERVAL - 1 {
            ai.tick(&mut world, &mut backend, 0);
        }
        assert_eq!(ai.difficulty(), 1);

        let id = ai.spawn_event_rider(0, &mut world).unwrap();
        ai.tick(&mut world, &mut backend, 0);
        assert_eq!(ai.difficulty(), 2);
        assert_eq!(ai.rider(id).unwrap().max_speed, 250);
    }

    #[test]
    fn test_rubber_band_catches_up_within_one_cycle() {
        let mut ai = AiSystem::default();
        let mut world = World::new(
            Player {
                track_position: 5000,
                ..Default::default()
            },
            crate::sim::random::seeded(10),
        );
        let mut backend = SpritePool::new();
        let id = ai
            .pool
            .spawn(Personality::RubberBand, Fx16::from_units(4000), 160, &mut world.rng)
            .unwrap();

        let limit = (DECISION_INTERVAL + DECISION_JITTER) as usize;
        let mut reached = false;
        for _ in 0..limit {
            ai.tick(&mut world, &mut backend, 0);
            if ai.rider(id).unwrap().state == RiderState::CatchingUp {
                reached = true;
                break;
            }
        }
        assert!(reached);
    }

    #[test]
    fn test_aggressive_rider_closes_and_attacks() {
        let mut ai = AiSystem::default();
        let mut world = World::new(
            Player {
                x: 120,
                speed: 100,
                track_position: 0,
            },
            crate::sim::random::seeded(11),
        );
        let mut backend = SpritePool::new();
        let id = ai
            .pool
            .spawn(Personality::Aggressive, Fx16::from_units(200), 120, &mut world.rng)
            .unwrap();

        let limit = (DECISION_INTERVAL + DECISION_JITTER) as usize;
        let mut attacked = false;
        for _ in 0..limit {
            ai.tick(&mut world, &mut backend, 0);
            if ai.rider(id).unwrap().state == RiderState::Attacking {
                attacked = true;
                break;
            }
        }
        assert!(attacked);
    }

    #[test]
    fn test_distant_rider_updates_on_alternate_frames() {
        let mut ai = AiSystem::default();
        let mut world = World::seeded(14);
        let mut backend = SpritePool::new();
        let near = ai
            .pool
            .spawn(Personality::Aggressive, Fx16::from_units(-100), 100, &mut world.rng)
            .unwrap();
        let far = ai
            .pool
            .spawn(Personality::Defensive, Fx16::from_units(400), 220, &mut world.rng)
            .unwrap();

        // First performance pass runs on frame 60
        for _ in 0..PERFORMANCE_INTERVAL {
            ai.tick(&mut world, &mut backend, 0);
        }
        assert!(!ai.rider(near).unwrap().throttled);
        assert!(ai.rider(far).unwrap().throttled);

        let mut updates = [0u16; 2];
        let mut far_moved = [false; 2];
        for i in 0..2 {
            let z = ai.rider(far).unwrap().world_z;
            ai.tick(&mut world, &mut backend, 0);
            updates[i] = ai.stats().updates_performed;
            far_moved[i] = ai.rider(far).unwrap().world_z != z;
        }
        assert_eq!(updates[0] + updates[1], 3);
        assert_eq!(updates[0].min(updates[1]), 1);
        assert!(far_moved[0] != far_moved[1]);
    }

    #[test]
    fn test_save_and_restore() {
        let (mut ai, mut world, mut backend) = setup(12, LevelType::Highway);
        drive(&mut ai, &mut world, &mut backend, 300);
        let snapshot = ai.save_state(&world);
        assert_eq!(snapshot.frame_counter, 300);
        assert_eq!(snapshot.active_riders as usize, ai.active_count());

        let (mut other, mut other_world, mut other_backend) = setup(99, LevelType::Highway);
        other
            .restore_state(&snapshot, &mut other_world, &mut other_backend)
            .unwrap();
        assert_eq!(other.frame(), 300);
        assert_eq!(other.difficulty(), snapshot.difficulty_level);
        assert_eq!(other_world.player.track_position, snapshot.track_position);
        assert_eq!(other.active_count(), 3);
        assert_eq!(other_backend.in_use(), 0);
    }

    #[test]
    fn test_restore_rejects_bad_snapshot() {
        let (mut ai, mut world, mut backend) = setup(13, LevelType::City);
        let bad = SaveState {
            difficulty_level: 9,
            ..Default::default()
        };
        assert!(ai.restore_state(&bad, &mut world, &mut backend).is_err());
        assert_eq!(ai.active_count(), 2);
    }

    proptest! {
        #[test]
        fn prop_pool_and_rider_invariants(
            seed in any::<u64>(),
            level in 0u8..3,
            player_speed in 0i16..260,
            frames in 1u32..400,
            curve in -40i16..40,
        ) {
            let mut ai = AiSystem::default();
            let mut world = World::seeded(seed);
            world.player.speed = player_speed;
            let mut backend = SpritePool::new();
            ai.initialize(LevelType::from_index(level), &mut world, &mut backend);

            for frame in 0..frames {
                world.player.track_position += i64::from(world.player.speed >> 6);
                if frame % 97 == 0 {
                    let _ = ai.spawn_event_rider(0, &mut world);
                }
                ai.tick(&mut world, &mut backend, curve);

                prop_assert!(ai.active_count() <= MAX_RIDERS);
                prop_assert_eq!(ai.active_count(), ai.pool.count_active_slots());
                prop_assert!(world.player.speed >= 0);

                let mut visible = 0;
                for (_, r) in ai.riders() {
                    prop_assert!((0..=MAX_HEALTH).contains(&r.health));
                    prop_assert!(r.speed >= 0);
                    prop_assert_eq!(r.visible, r.sprite.is_some());
                    visible += usize::from(r.visible);
                }
                prop_assert_eq!(backend.in_use(), visible);
            }
        }

        #[test]
        fn prop_spawning_into_full_pool_is_noop(seed in any::<u64>(), extra in 1usize..6) {
            let mut ai = AiSystem::default();
            let mut world = World::seeded(seed);
            for _ in 0..MAX_RIDERS {
                prop_assert!(ai.spawn_event_rider(0, &mut world).is_some());
            }
            for _ in 0..extra {
                prop_assert!(ai.spawn_event_rider(0, &mut world).is_none());
            }
            prop_assert_eq!(ai.active_count(), MAX_RIDERS);
        }
    }
}
