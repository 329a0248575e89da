//! World context owned by the surrounding game loop
//!
//! The AI core reads the player and track from here every frame. Its only
//! sanctioned writes are the combat side effects on player speed and lateral
//! position.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fixed::Fx16;
use super::random::seeded;

/// Player state as seen by the AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Screen-space lateral position
    pub x: i32,
    /// Current speed (never negative)
    pub speed: i16,
    /// Distance travelled along the track (world units)
    pub track_position: i64,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: crate::consts::ROAD_CENTER,
            speed: 0,
            track_position: 0,
        }
    }
}

impl Player {
    /// Player longitudinal position in fixed-point
    #[inline]
    pub fn world_z(&self) -> Fx16 {
        Fx16::from_units(self.track_position)
    }

    /// Lower player speed, saturating at zero
    #[inline]
    pub fn slow_down(&mut self, amount: i16) {
        self.speed = self.speed.saturating_sub(amount).max(0);
    }
}

/// Everything the AI consumes from outside: player, track and randomness
#[derive(Debug, Clone)]
pub struct World<R> {
    pub player: Player,
    pub rng: R,
}

impl World<Pcg32> {
    /// World with a seeded default generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            player: Player::default(),
            rng: seeded(seed),
        }
    }
}

impl<R> World<R> {
    pub fn new(player: Player, rng: R) -> Self {
        Self { player, rng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_down_saturates() {
        let mut player = Player {
            speed: 10,
            ..Default::default()
        };
        player.slow_down(15);
        assert_eq!(player.speed, 0);
        player.slow_down(1);
        assert_eq!(player.speed, 0);
    }

    #[test]
    fn test_world_z_scales_track() {
        let player = Player {
            track_position: 250,
            ..Default::default()
        };
        assert_eq!(player.world_z(), Fx16::from_units(250));
    }
}
