//! Road Rivals - competitor rider AI for a pseudo-3D road combat racer
//!
//! Core modules:
//! - `sim`: Deterministic rider simulation (spawning, decisions, physics, combat)
//! - `presentation`: Sprite backend seam the simulation hands visibility to
//! - `persistence`: Minimal save snapshot with a versioned envelope
//! - `tuning`: Data-driven gameplay constants

pub mod error;
pub mod persistence;
pub mod presentation;
pub mod sim;
pub mod tuning;

pub use error::AiError;
pub use presentation::{Presentation, SpriteHandle, SpritePool};
pub use sim::{AiSystem, LevelType, Personality, RiderId, RiderState, World};
pub use tuning::Tuning;

/// Gameplay constants that are structural rather than balance knobs
pub mod consts {
    /// Capacity of the rider pool
    pub const MAX_RIDERS: usize = 8;

    /// Frames between racing decisions (before jitter)
    pub const DECISION_INTERVAL: i16 = 30;
    /// Decision interval jitter (±)
    pub const DECISION_JITTER: i16 = 10;

    /// Road center (screen x)
    pub const ROAD_CENTER: i32 = 160;
    /// Band racing targets are clamped to
    pub const DRIVABLE_MIN_X: i32 = 80;
    pub const DRIVABLE_MAX_X: i32 = 240;
    /// Hard lateral bounds; touching them is running off-road
    pub const LATERAL_MIN_X: i32 = 60;
    pub const LATERAL_MAX_X: i32 = 260;
    /// Speed lost per frame spent on a lateral bound
    pub const OFF_ROAD_PENALTY: i16 = 5;

    /// Screen line the player bike sits on
    pub const PLAYER_SCREEN_Y: i32 = 190;
    /// Highest screen y a rider ahead can be projected to
    pub const HORIZON_Y: i32 = 120;
    /// Lowest screen y a rider behind can be projected to
    pub const SCREEN_BOTTOM_Y: i32 = 224;

    /// Absolute speed ceiling for boosted states
    pub const SPEED_CAP: i16 = 255;
    /// Ceiling for max speed after difficulty boosts
    pub const MAX_SPEED_CAP: i16 = 280;
    pub const MAX_HEALTH: i16 = 100;
    pub const MAX_AGGRESSION: u8 = 255;

    /// World Z advances by `speed << SPEED_SHIFT` per frame (speed / 64 units)
    pub const SPEED_SHIFT: u32 = 10;

    /// State durations (frames)
    pub const AGGRESSIVE_ATTACK_FRAMES: u16 = 60;
    pub const ERRATIC_ATTACK_FRAMES: u16 = 30;
    pub const DEFENSIVE_AVOID_FRAMES: u16 = 90;
    pub const CLOSE_AVOID_FRAMES: u16 = 60;
    pub const CATCH_UP_FRAMES: u16 = 120;
    pub const CRASH_FRAMES: u16 = 60;
    pub const STRIKE_CRASH_FRAMES: u16 = 90;
    pub const PILEUP_AVOID_FRAMES: u16 = 45;

    /// Cooldown set when an attack run times out
    pub const ATTACK_RUN_COOLDOWN: u16 = 180;
    /// Cooldown after an attack attempt: base + random(0..spread)
    pub const ATTACK_COOLDOWN_BASE: u16 = 120;
    pub const ATTACK_COOLDOWN_SPREAD: u16 = 60;

    /// Health regained when a crash recovery completes
    pub const CRASH_RECOVERY_HEAL: i16 = 20;
    /// Health lost by the slower rider in a player collision
    pub const PLAYER_COLLISION_DAMAGE: i16 = 15;
    /// Speed lost by a rider struck by the player
    pub const STRIKE_SPEED_LOSS: i16 = 20;
    /// Lateral shove applied to the player when a faster rider hits them
    pub const PLAYER_SHOVE: i32 = 10;

    /// Spawner cadence
    pub const SPAWN_CHECK_INTERVAL: u32 = 15;
    /// Spawn lane jitter (±)
    pub const SPAWN_LANE_JITTER: i32 = 20;
    /// Track distance is measured in blocks of 16 units for spawn triggers
    pub const SPAWN_DISTANCE_SHIFT: u32 = 4;

    /// Difficulty escalation cadence (30 s at 60 fps)
    pub const DIFFICULTY_INTERVAL: u16 = 1800;
    pub const MIN_DIFFICULTY: u8 = 1;
    pub const MAX_DIFFICULTY: u8 = 5;

    /// Performance pass cadence
    pub const PERFORMANCE_INTERVAL: u8 = 60;

    /// Animation cadence and cycle length
    pub const ANIM_FRAME_TICKS: u8 = 8;
    pub const ANIM_FRAMES: u8 = 4;

    /// Event spawn: distance ahead and base lane
    pub const EVENT_SPAWN_AHEAD: i64 = 200;
    pub const EVENT_SPAWN_LANE: i32 = 140;
}

/// Symmetric box proximity test on screen coordinates
#[inline]
pub fn within(a: glam::IVec2, b: glam::IVec2, threshold: i32) -> bool {
    (a - b).abs().cmplt(glam::IVec2::splat(threshold)).all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;

    #[test]
    fn test_within_is_symmetric() {
        let a = IVec2::new(100, 190);
        let b = IVec2::new(117, 175);
        assert!(within(a, b, 18));
        assert!(within(b, a, 18));
        assert!(!within(a, b, 17));
    }

    #[test]
    fn test_within_needs_both_axes() {
        let a = IVec2::new(100, 100);
        assert!(!within(a, IVec2::new(100, 140), 20));
        assert!(!within(a, IVec2::new(140, 100), 20));
    }
}
