//! Personality-driven decision engine
//!
//! Timed states (Attacking, Avoiding, Crashed, CatchingUp) are serviced every
//! frame so their timers are frame-exact. Racing riders only reconsider their
//! line when the decision timer runs out, which staggers the work across the
//! pool and keeps riders from twitching.

use super::collision::{AttackOutcome, perform_attack};
use super::random::RandomSource;
use super::state::{Personality, Rider, RiderState};
use super::world::Player;
use crate::consts::*;
use crate::tuning::Tuning;

/// One frame of decision making for one rider
///
/// Returns the outcome when the rider swung at the player this frame.
pub fn update<R: RandomSource>(
    rider: &mut Rider,
    player: &mut Player,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<AttackOutcome> {
    rider.player_distance = (rider.x() - player.x).abs();

    match rider.state {
        RiderState::Racing => {
            if rider.decision_timer > 0 {
                rider.decision_timer -= 1;
                return None;
            }
            rider.decision_timer = DECISION_INTERVAL + rng.jitter(DECISION_JITTER);
            rider.cruise_speed = rider.max_speed;
            racing(rider, player, tuning, rng);
            rider.target_x = rider.target_x.clamp(DRIVABLE_MIN_X, DRIVABLE_MAX_X);
            None
        }
        RiderState::Attacking => attacking(rider, player, tuning, rng),
        RiderState::Avoiding => {
            avoiding(rider, player, tuning);
            None
        }
        RiderState::Crashed => {
            crashed(rider);
            None
        }
        RiderState::CatchingUp => {
            catching_up(rider);
            None
        }
    }
}

/// Tick the state timer; true once it has run out
fn expired(rider: &mut Rider) -> bool {
    rider.state_timer = rider.state_timer.saturating_sub(1);
    rider.state_timer == 0
}

fn back_to_racing(rider: &mut Rider) {
    rider.enter(RiderState::Racing, 0);
    rider.cruise_speed = rider.max_speed;
}

fn racing<R: RandomSource>(rider: &mut Rider, player: &Player, tuning: &Tuning, rng: &mut R) {
    let distance = rider.player_distance;

    match rider.personality {
        Personality::Aggressive => {
            if distance < tuning.sight_distance && rider.aggression > tuning.aggressive_hunt_threshold {
                rider.target_x = player.x + i32::from(rng.jitter(20));
                if distance < tuning.attack_range {
                    rider.enter(RiderState::Attacking, AGGRESSIVE_ATTACK_FRAMES);
                }
            } else {
                rider.target_x = ROAD_CENTER + i32::from(rng.jitter(40));
            }
        }
        Personality::Defensive => {
            let swerve = if distance < tuning.defensive_avoid_radius {
                if rider.x() < player.x {
                    -tuning.defensive_swerve
                } else {
                    tuning.defensive_swerve
                }
            } else {
                0
            };
            rider.target_x = ROAD_CENTER + swerve;
            if distance < tuning.defensive_panic_radius {
                rider.enter(RiderState::Avoiding, DEFENSIVE_AVOID_FRAMES);
            }
        }
        Personality::Erratic => {
            if rng.percent() < tuning.erratic_retarget_chance {
                rider.target_x = DRIVABLE_MIN_X + 20 + i32::from(rng.below(120));
            }
            if distance < tuning.erratic_attack_radius && rng.percent() < tuning.erratic_attack_chance {
                rider.enter(RiderState::Attacking, ERRATIC_ATTACK_FRAMES);
            }
        }
        Personality::RubberBand => rubber_band(rider, player, tuning, rng),
        Personality::Blocker => {
            rider.target_x = player.x + i32::from(rng.jitter(10));
            if rider.world_z > player.world_z() {
                let hold = player.speed.saturating_add(1);
                rider.speed = rider.speed.min(hold);
                rider.cruise_speed = rider.speed;
            }
        }
    }
}

/// Station keeping against the player's track position
fn rubber_band<R: RandomSource>(rider: &mut Rider, player: &Player, tuning: &Tuning, rng: &mut R) {
    let behind = (player.world_z() - rider.world_z).units();

    if behind > tuning.rubber_band_distance {
        rider.enter(RiderState::CatchingUp, CATCH_UP_FRAMES);
        rider.speed = (rider.max_speed + 20).min(SPEED_CAP);
        rider.cruise_speed = rider.speed;
    } else if behind < -tuning.rubber_band_distance {
        rider.speed = (rider.speed - 2).max(rider.max_speed >> 2);
        rider.cruise_speed = rider.speed;
    } else {
        rider.speed = rider.max_speed;
    }

    rider.target_x = ROAD_CENTER + i32::from(rng.jitter(30));
}

fn attacking<R: RandomSource>(
    rider: &mut Rider,
    player: &mut Player,
    tuning: &Tuning,
    rng: &mut R,
) -> Option<AttackOutcome> {
    rider.target_x = player.x;
    let boost = rider.max_speed + 10;
    rider.speed = (rider.speed + 2).min(boost);
    rider.cruise_speed = boost;

    let outcome = if rider.player_distance < tuning.attack_range && rider.can_attack {
        Some(perform_attack(rider, player, tuning, rng))
    } else {
        None
    };

    if expired(rider) {
        back_to_racing(rider);
        rider.attack_cooldown = ATTACK_RUN_COOLDOWN;
        rider.can_attack = false;
    }
    outcome
}

fn avoiding(rider: &mut Rider, player: &Player, tuning: &Tuning) {
    let away = if rider.x() < player.x { -1 } else { 1 };
    rider.target_x = rider.x() + away * tuning.avoid_offset;
    rider.speed = (rider.speed - 1).max(rider.max_speed >> 2);
    rider.cruise_speed = rider.speed;

    if expired(rider) {
        back_to_racing(rider);
    }
}

fn crashed(rider: &mut Rider) {
    rider.speed = 0;
    rider.cruise_speed = 0;
    rider.target_x = rider.x();

    if expired(rider) {
        back_to_racing(rider);
        rider.speed = rider.max_speed >> 2;
        rider.heal(CRASH_RECOVERY_HEAL);
    }
}

fn catching_up(rider: &mut Rider) {
    rider.speed = (rider.max_speed + 30).min(SPEED_CAP);
    rider.cruise_speed = rider.speed;
    rider.target_x = ROAD_CENTER;

    if expired(rider) {
        back_to_racing(rider);
    }
}
