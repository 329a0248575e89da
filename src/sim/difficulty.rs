//! Time-based difficulty escalation

use serde::{Deserialize, Serialize};

use super::state::RiderPool;
use crate::consts::*;

/// Difficulty level plus the frame counter driving escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    level: u8,
    timer: u16,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new(MIN_DIFFICULTY)
    }
}

impl Difficulty {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY),
            timer: 0,
        }
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Advance one frame. Returns the new level when it escalated.
    ///
    /// Every `DIFFICULTY_INTERVAL` frames the level rises and every active
    /// rider gets faster, meaner and quicker off the line. Once the level is
    /// at the cap nothing changes.
    pub fn update(&mut self, pool: &mut RiderPool) -> Option<u8> {
        self.timer += 1;
        if self.timer < DIFFICULTY_INTERVAL {
            return None;
        }
        self.timer = 0;

        if self.level >= MAX_DIFFICULTY {
            return None;
        }
        self.level += 1;

        let speed_boost = 5 * i16::from(self.level);
        for (_, rider) in pool.iter_mut() {
            rider.max_speed = (rider.max_speed + speed_boost).min(MAX_SPEED_CAP);
            rider.aggression = rider.aggression.saturating_add(20).min(MAX_AGGRESSION);
            rider.acceleration += 1;
        }

        log::info!("Difficulty escalated to {}", self.level);
        Some(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fixed::Fx16;
    use crate::sim::random::seeded;
    use crate::sim::state::Personality;

    #[test]
    fn test_escalates_after_interval() {
        let mut pool = RiderPool::new();
        let id = pool
            .spawn(Personality::Defensive, Fx16::ZERO, 160, &mut seeded(1))
            .unwrap();
        let mut difficulty = Difficulty::new(1);

        for _ in 0..DIFFICULTY_INTERVAL - 1 {
            assert_eq!(difficulty.update(&mut pool), None);
        }
        assert_eq!(difficulty.update(&mut pool), Some(2));

        let r = pool.get(id).unwrap();
        assert_eq!(r.max_speed, 210);
        assert_eq!(r.aggression, 100);
        assert_eq!(r.acceleration, 4);
    }

    #[test]
    fn test_no_boost_once_capped() {
        let mut pool = RiderPool::new();
        let id = pool
            .spawn(Personality::Defensive, Fx16::ZERO, 160, &mut seeded(1))
            .unwrap();
        let mut difficulty = Difficulty::new(MAX_DIFFICULTY);
        for _ in 0..DIFFICULTY_INTERVAL * 3 {
            assert_eq!(difficulty.update(&mut pool), None);
        }
        assert_eq!(difficulty.level(), MAX_DIFFICULTY);
        let r = pool.get(id).unwrap();
        assert_eq!(r.max_speed, 200);
        assert_eq!(r.aggression, 80);
        assert_eq!(r.acceleration, 3);
    }

    #[test]
    fn test_boost_stops_at_cap() {
        let mut pool = RiderPool::new();
        let id = pool
            .spawn(Personality::Aggressive, Fx16::ZERO, 160, &mut seeded(1))
            .unwrap();
        let mut difficulty = Difficulty::new(4);
        for _ in 0..DIFFICULTY_INTERVAL * 3 {
            difficulty.update(&mut pool);
        }
        assert_eq!(difficulty.level(), MAX_DIFFICULTY);
        let r = pool.get(id).unwrap();
        // One escalation, 4 -> 5, adds 5 * 5
        assert_eq!(r.max_speed, 265);
        assert_eq!(r.aggression, 220);
        assert_eq!(r.acceleration, 5);
    }

    #[test]
    fn test_new_clamps_level() {
        assert_eq!(Difficulty::new(0).level(), 1);
        assert_eq!(Difficulty::new(9).level(), 5);
    }
}
