//! Level spawn tables and the rider spawner
//!
//! Each level archetype has a fixed table of spawn points terminated by a
//! sentinel (zero trigger distance). The spawner walks it every
//! `SPAWN_CHECK_INTERVAL` frames rather than every frame so riders trickle in
//! instead of arriving in bursts.

use serde::{Deserialize, Serialize};

use super::fixed::Fx16;
use super::random::RandomSource;
use super::state::{AiStats, Personality, RiderPool};
use super::world::Player;
use crate::consts::*;

/// One spawn table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPoint {
    /// Track distance (16-unit blocks) past the last check that arms this entry
    pub trigger_distance: u16,
    pub personality: Personality,
    pub lane_x: i32,
    /// Base spawn chance out of 256
    pub probability: u8,
}

const fn point(trigger_distance: u16, personality: Personality, lane_x: i32, probability: u8) -> SpawnPoint {
    SpawnPoint {
        trigger_distance,
        personality,
        lane_x,
        probability,
    }
}

/// Table terminator
pub const SENTINEL: SpawnPoint = point(0, Personality::Aggressive, 0, 0);

use Personality::*;

static CITY_SPAWNS: [SpawnPoint; 6] = [
    point(200, Aggressive, 120, 180),
    point(350, Defensive, 200, 150),
    point(450, Blocker, 160, 100),
    point(600, Erratic, 140, 120),
    point(750, RubberBand, 180, 200),
    SENTINEL,
];

static HIGHWAY_SPAWNS: [SpawnPoint; 7] = [
    point(150, RubberBand, 140, 200),
    point(280, Aggressive, 180, 160),
    point(400, Defensive, 120, 140),
    point(520, Erratic, 200, 100),
    point(650, Blocker, 160, 120),
    point(800, Aggressive, 220, 180),
    SENTINEL,
];

static MOUNTAIN_SPAWNS: [SpawnPoint; 5] = [
    point(300, Defensive, 160, 180),
    point(450, RubberBand, 140, 160),
    point(600, Erratic, 180, 120),
    point(750, Aggressive, 200, 140),
    SENTINEL,
];

/// Level archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelType {
    #[default]
    City,
    Highway,
    Mountain,
}

impl LevelType {
    /// Map a level index; unknown indices fall back to City
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => LevelType::Highway,
            2 => LevelType::Mountain,
            _ => LevelType::City,
        }
    }

    /// Spawn table, sentinel included
    pub fn spawn_table(self) -> &'static [SpawnPoint] {
        match self {
            LevelType::City => &CITY_SPAWNS,
            LevelType::Highway => &HIGHWAY_SPAWNS,
            LevelType::Mountain => &MOUNTAIN_SPAWNS,
        }
    }

    /// Difficulty a level starts at
    pub fn base_difficulty(self) -> u8 {
        match self {
            LevelType::City => 1,
            LevelType::Highway => 2,
            LevelType::Mountain => 3,
        }
    }
}

/// Walks the active level's spawn table
#[derive(Debug, Clone)]
pub struct Spawner {
    table: &'static [SpawnPoint],
    /// Track distance (16-unit blocks) at the last entry that fired
    last_check: i64,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new(LevelType::default())
    }
}

impl Spawner {
    pub fn new(level: LevelType) -> Self {
        Self {
            table: level.spawn_table(),
            last_check: 0,
        }
    }

    /// Swap tables wholesale and forget progress
    pub fn select(&mut self, level: LevelType) {
        self.table = level.spawn_table();
        self.last_check = 0;
    }

    pub fn reset(&mut self) {
        self.last_check = 0;
    }

    /// Entries up to the sentinel
    pub fn entries(&self) -> impl Iterator<Item = &SpawnPoint> + '_ {
        self.table.iter().take_while(|p| p.trigger_distance != 0)
    }

    /// Opening batch of `2 + difficulty / 2` riders from the head of the table
    pub fn spawn_initial<R: RandomSource>(
        &self,
        pool: &mut RiderPool,
        player: &Player,
        difficulty: u8,
        rng: &mut R,
        stats: &mut AiStats,
    ) {
        let count = 2 + usize::from(difficulty >> 1);
        for point in self.entries().take(count) {
            let z = player.world_z() + Fx16::from_units(i64::from(point.trigger_distance));
            if pool.spawn(point.personality, z, point.lane_x, rng).is_some() {
                stats.total_spawned += 1;
            }
        }
    }

    /// Periodic table walk
    pub fn update<R: RandomSource>(
        &mut self,
        frame: u32,
        pool: &mut RiderPool,
        player: &Player,
        difficulty: u8,
        rng: &mut R,
        stats: &mut AiStats,
    ) {
        if frame % SPAWN_CHECK_INTERVAL != 0 {
            return;
        }

        let travelled = player.track_position >> SPAWN_DISTANCE_SHIFT;
        let ceiling = 4 + usize::from(difficulty);

        for point in self.table.iter().take_while(|p| p.trigger_distance != 0) {
            if travelled < self.last_check + i64::from(point.trigger_distance) {
                continue;
            }

            let roll = rng.byte();
            let chance = (u16::from(point.probability) * u16::from(difficulty) / 3).min(255);
            if u16::from(roll) < chance {
                let z = player.world_z() + Fx16::from_units(i64::from(point.trigger_distance));
                let lane = point.lane_x + i32::from(rng.jitter(SPAWN_LANE_JITTER as i16));
                if pool.active_count() < ceiling
                    && pool.spawn(point.personality, z, lane, rng).is_some()
                {
                    stats.total_spawned += 1;
                }
            }

            self.last_check = travelled;
        }
    }
}
