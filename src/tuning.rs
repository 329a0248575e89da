//! Data-driven gameplay balance
//!
//! Distance thresholds and roll chances for the rider personalities. The
//! defaults are the hand-tuned values the game ships with; a JSON file can
//! override any subset of them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Balance knobs for the rider AI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Perception ===
    /// Lateral distance within which an aggressive rider hunts the player
    pub sight_distance: i32,
    /// Lateral distance within which an attack can land
    pub attack_range: i32,
    /// Longitudinal slack before rubber-banding kicks in (world units)
    pub rubber_band_distance: i64,

    // === Racing personalities ===
    /// Aggression needed before an aggressive rider goes hunting
    pub aggressive_hunt_threshold: u8,
    /// Defensive riders swerve when the player is this close laterally
    pub defensive_avoid_radius: i32,
    /// How far off center a defensive rider swerves
    pub defensive_swerve: i32,
    /// Defensive riders bail into Avoiding inside this radius
    pub defensive_panic_radius: i32,
    /// Chance (percent) an erratic rider picks a new line
    pub erratic_retarget_chance: u16,
    /// Erratic riders consider attacking inside this radius
    pub erratic_attack_radius: i32,
    /// Chance (percent) an erratic rider starts an attack run
    pub erratic_attack_chance: u16,
    /// Offset used by Avoiding riders to steer away from the player
    pub avoid_offset: i32,

    // === Close interaction ===
    /// Lateral radius for non-collision interactions
    pub close_interaction_radius: i32,
    /// Aggressive riders lean on the player inside this radius
    pub intimidation_radius: i32,
    /// Blockers cut across the player inside this radius
    pub block_radius: i32,
    /// Blocker offset from the player lane
    pub block_offset: i32,
    /// Defensive riders bail inside this radius
    pub defensive_close_radius: i32,

    // === Combat ===
    /// Chance (percent) an erratic attack is swung at all
    pub erratic_attack_success: u16,
    /// Hit radius for aggressive and blocker attacks
    pub heavy_hit_radius: i32,
    /// Hit radius for erratic attacks
    pub erratic_hit_radius: i32,
    /// Hit radius for everyone else
    pub light_hit_radius: i32,
    /// Player speed lost per landed attack
    pub heavy_hit_damage: i16,
    pub erratic_hit_damage: i16,
    pub light_hit_damage: i16,

    // === Collision ===
    pub player_collision_threshold: i32,
    pub rider_collision_threshold: i32,

    // === Performance ===
    /// Riders closer than this (world units) are shown
    pub visibility_distance: i64,
    /// Riders farther than this update every other frame
    pub throttle_distance: i64,
    /// Riders farther than this are removed
    pub cull_distance: i64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            sight_distance: 200,
            attack_range: 32,
            rubber_band_distance: 400,

            aggressive_hunt_threshold: 150,
            defensive_avoid_radius: 80,
            defensive_swerve: 60,
            defensive_panic_radius: 40,
            erratic_retarget_chance: 30,
            erratic_attack_radius: 60,
            erratic_attack_chance: 25,
            avoid_offset: 80,

            close_interaction_radius: 40,
            intimidation_radius: 20,
            block_radius: 30,
            block_offset: 15,
            defensive_close_radius: 25,

            erratic_attack_success: 70,
            heavy_hit_radius: 24,
            erratic_hit_radius: 28,
            light_hit_radius: 20,
            heavy_hit_damage: 15,
            erratic_hit_damage: 10,
            light_hit_damage: 5,

            player_collision_threshold: 20,
            rider_collision_threshold: 18,

            visibility_distance: 500,
            throttle_distance: 300,
            cull_distance: 800,
        }
    }
}

impl Tuning {
    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, AiError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(AiError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, AiError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
