//! Distance-based culling and update throttling
//!
//! Riders are split into tiers by longitudinal distance from the player:
//! near riders update every frame, far riders every other frame, and riders
//! past the cull distance are removed. Tiers are recomputed periodically,
//! not every frame.

use super::fixed::Fx16;
use super::state::RiderPool;
use crate::consts::*;
use crate::presentation::Presentation;
use crate::tuning::Tuning;

/// Update tier for one rider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTier {
    /// Updated every frame
    Full,
    /// Updated on alternate frames
    Throttled,
    /// Too far to matter; removed
    Culled,
}

/// Classify a rider by its distance from the player
pub fn classify(distance: Fx16, tuning: &Tuning) -> UpdateTier {
    let units = distance.abs().units();
    if units > tuning.cull_distance {
        UpdateTier::Culled
    } else if units > tuning.throttle_distance {
        UpdateTier::Throttled
    } else {
        UpdateTier::Full
    }
}

/// Whether a rider at `rank` in the update order runs this frame
///
/// Throttled riders alternate by rank parity so half of them update each
/// frame.
#[inline]
pub fn should_update(throttled: bool, rank: usize, frame: u32) -> bool {
    !throttled || (frame & 1) as usize != (rank & 1)
}

/// Periodic re-sort, cull and throttle pass
#[derive(Debug, Clone, Default)]
pub struct PerformanceManager {
    timer: u8,
}

impl PerformanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.timer = 0;
    }

    /// Advance one frame; every `PERFORMANCE_INTERVAL` frames re-sort the
    /// pool nearest first, cull distant riders and mark throttled ones.
    /// Returns how many riders were culled.
    pub fn update<P: Presentation>(
        &mut self,
        pool: &mut RiderPool,
        player_z: Fx16,
        tuning: &Tuning,
        backend: &mut P,
    ) -> usize {
        self.timer += 1;
        if self.timer < PERFORMANCE_INTERVAL {
            return 0;
        }
        self.timer = 0;

        pool.sort_by_distance(player_z);

        let mut culled = 0;
        for (_, id) in pool.update_order().iter() {
            let Some(rider) = pool.get_mut(id) else {
                continue;
            };
            match classify(rider.world_z - player_z, tuning) {
                UpdateTier::Culled => {
                    log::debug!("Culling rider in slot {}", id.index());
                    pool.disable(id, backend);
                    culled += 1;
                }
                tier => rider.throttled = tier == UpdateTier::Throttled,
            }
        }
        culled
    }
}
