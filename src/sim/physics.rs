//! Per-rider physics integration
//!
//! Integer-only so replays are bit-identical: steering toward the decision
//! engine's target, drift from road curvature, acceleration toward the
//! cruise speed, longitudinal advance, lateral bounds and timers.

use super::fixed::Fx16;
use super::state::{Rider, RiderState};
use crate::consts::*;

/// Low-level step: steer toward `target_x` against `road_curve`
///
/// Steering converges by `handling / 2048` of the remaining gap per frame
/// (at least one unit). Curvature pushes the rider to the outside of the bend
/// proportionally to speed, less so for riders with good handling.
pub fn integrate_step(rider: &mut Rider, target_x: i32, road_curve: i16) {
    let handling = i32::from(rider.handling);

    let gap = target_x - rider.screen.x;
    let mut steer = (gap * handling) >> 11;
    if steer == 0 {
        steer = gap.signum();
    }

    let drift = (i32::from(road_curve) * i32::from(rider.speed) * (256 - handling)) >> 17;

    rider.screen.x += steer - drift;
    rider.world_x = Fx16::from_units(i64::from(rider.screen.x));

    if rider.state != RiderState::Crashed && rider.speed < rider.cruise_speed {
        rider.speed = (rider.speed + rider.acceleration.max(1)).min(rider.cruise_speed);
    }
}

/// Full per-frame advance for one rider
pub fn advance(rider: &mut Rider, road_curve: i16, player_z: Fx16) {
    let target_x = rider.target_x;
    integrate_step(rider, target_x, road_curve);

    rider.world_z += Fx16::from_speed(rider.speed, SPEED_SHIFT);

    // Running off-road
    if rider.screen.x < LATERAL_MIN_X {
        rider.screen.x = LATERAL_MIN_X;
        rider.slow_down(OFF_ROAD_PENALTY);
    }
    if rider.screen.x > LATERAL_MAX_X {
        rider.screen.x = LATERAL_MAX_X;
        rider.slow_down(OFF_ROAD_PENALTY);
    }
    rider.world_x = Fx16::from_units(i64::from(rider.screen.x));

    // Boosts wear off
    if rider.speed > rider.max_speed {
        rider.speed = (rider.speed - 1).max(rider.max_speed);
    }

    if rider.attack_cooldown > 0 {
        rider.attack_cooldown -= 1;
    }
    if !rider.can_attack && rider.attack_cooldown == 0 {
        rider.can_attack = true;
    }

    rider.screen.y = project_screen_y(rider.world_z - player_z);
}

/// Pseudo-3D screen line for a rider `relative_z` ahead of the player
///
/// Level with the player is the player line; ahead rises toward the horizon,
/// behind drops toward the bottom of the screen.
pub fn project_screen_y(relative_z: Fx16) -> i32 {
    let rel = relative_z.units();
    if rel >= 0 {
        let lift = (rel >> 2).min(i64::from(PLAYER_SCREEN_Y - HORIZON_Y)) as i32;
        PLAYER_SCREEN_Y - lift
    } else {
        let drop = ((-rel) >> 2).min(i64::from(SCREEN_BOTTOM_Y - PLAYER_SCREEN_Y)) as i32;
        PLAYER_SCREEN_Y + drop
    }
}
