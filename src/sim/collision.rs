//! Proximity, collision and combat between riders and the player
//!
//! Two kinds of contact are modeled. Close interactions trigger on lateral
//! distance alone and express personality (intimidating, blocking, bailing
//! out). Collisions use a symmetric box test on screen coordinates and
//! exchange speed, damage and state.

use glam::IVec2;

use super::random::RandomSource;
use super::state::{Personality, Rider, RiderState};
use super::world::Player;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::within;

/// Result of a rider's swing at the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Cooldown still running; nothing happened
    OnCooldown,
    /// Erratic swing that never came off
    Fumbled,
    /// Swung but the player was out of reach
    Missed,
    /// Landed; the player lost this much speed
    Landed { speed_loss: i16 },
}

/// Result of a rider/player collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCollision {
    /// Player was faster and knocked the rider down
    RiderCrashed { knocked_out: bool },
    /// Rider was at least as fast and shoved the player
    PlayerShoved { speed_loss: i16 },
}

/// Result of a player strike on a rider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    Hit,
    Knockout,
}

/// Screen position of the player bike
#[inline]
pub fn player_screen(player: &Player) -> IVec2 {
    IVec2::new(player.x, PLAYER_SCREEN_Y)
}

/// Rider swings at the player
///
/// Only proceeds when the rider's cooldown has lapsed. Any attempt, landed
/// or not, re-arms a randomized cooldown and disables attacking until it
/// runs out.
pub fn perform_attack<R: RandomSource>(
    rider: &mut Rider,
    player: &mut Player,
    tuning: &Tuning,
    rng: &mut R,
) -> AttackOutcome {
    if rider.attack_cooldown > 0 {
        return AttackOutcome::OnCooldown;
    }

    let target = player_screen(player);
    let swing = |radius: i32, damage: i16| {
        if within(rider.screen, target, radius) {
            AttackOutcome::Landed { speed_loss: damage }
        } else {
            AttackOutcome::Missed
        }
    };

    let outcome = match rider.personality {
        Personality::Aggressive | Personality::Blocker => {
            swing(tuning.heavy_hit_radius, tuning.heavy_hit_damage)
        }
        Personality::Erratic => {
            if rng.percent() < tuning.erratic_attack_success {
                swing(tuning.erratic_hit_radius, tuning.erratic_hit_damage)
            } else {
                AttackOutcome::Fumbled
            }
        }
        Personality::Defensive | Personality::RubberBand => {
            swing(tuning.light_hit_radius, tuning.light_hit_damage)
        }
    };

    if let AttackOutcome::Landed { speed_loss } = outcome {
        player.slow_down(speed_loss);
    }

    rider.can_attack = false;
    rider.attack_cooldown = ATTACK_COOLDOWN_BASE + rng.below(ATTACK_COOLDOWN_SPREAD);
    outcome
}

/// Non-collision interaction for a rider within the close radius
pub fn close_interaction(rider: &mut Rider, player: &mut Player, tuning: &Tuning) {
    let dx = (rider.x() - player.x).abs();
    match rider.personality {
        Personality::Aggressive => {
            if dx < tuning.intimidation_radius && player.speed > 0 {
                player.slow_down(1);
            }
        }
        Personality::Blocker => {
            if dx < tuning.block_radius {
                let side = if rider.x() < player.x { -1 } else { 1 };
                rider.target_x = player.x + side * tuning.block_offset;
                rider.speed = rider.speed.min(player.speed.saturating_add(1));
                rider.cruise_speed = rider.speed;
            }
        }
        Personality::Defensive => {
            if dx < tuning.defensive_close_radius && rider.state != RiderState::Crashed {
                rider.enter(RiderState::Avoiding, CLOSE_AVOID_FRAMES);
            }
        }
        Personality::Erratic | Personality::RubberBand => {}
    }
}

/// Resolve a rider/player collision by relative speed
pub fn resolve_player_collision(rider: &mut Rider, player: &mut Player) -> PlayerCollision {
    let impact = ((i32::from(rider.speed) + i32::from(player.speed)) >> 3) as i16;

    if player.speed > rider.speed {
        rider.slow_down(impact);
        rider.enter(RiderState::Crashed, CRASH_FRAMES);
        rider.cruise_speed = 0;
        let knocked_out = rider.damage(PLAYER_COLLISION_DAMAGE);
        PlayerCollision::RiderCrashed { knocked_out }
    } else {
        let speed_loss = impact >> 1;
        player.slow_down(speed_loss);
        player.x += if rider.x() > player.x { -PLAYER_SHOVE } else { PLAYER_SHOVE };
        PlayerCollision::PlayerShoved { speed_loss }
    }
}

/// Rider/rider collision: share speed, both back off
///
/// Both riders take the average speed and go into Avoiding so they separate
/// instead of clipping each other again next frame. Riders already down are
/// left alone.
pub fn resolve_rider_collision(a: &mut Rider, b: &mut Rider) -> bool {
    if a.state == RiderState::Crashed || b.state == RiderState::Crashed {
        return false;
    }
    let shared = ((i32::from(a.speed) + i32::from(b.speed)) >> 1) as i16;
    for rider in [a, b] {
        rider.speed = shared;
        rider.cruise_speed = shared;
        rider.enter(RiderState::Avoiding, PILEUP_AVOID_FRAMES);
    }
    true
}

/// Player strikes a rider
pub fn strike_rider(rider: &mut Rider, damage: i16) -> StrikeOutcome {
    rider.slow_down(STRIKE_SPEED_LOSS);
    rider.enter(RiderState::Crashed, STRIKE_CRASH_FRAMES);
    rider.cruise_speed = 0;
    if rider.damage(damage) {
        StrikeOutcome::Knockout
    } else {
        StrikeOutcome::Hit
    }
}
