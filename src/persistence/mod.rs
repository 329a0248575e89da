//! Save/load of the AI snapshot
//!
//! The snapshot is deliberately small: enough to resume difficulty, track
//! position and frame count. Rider records are not stored; restoring
//! regenerates the opening batch instead. On disk it is a versioned JSON
//! envelope.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::AiError;

/// Current envelope version
pub const SAVE_VERSION: u32 = 1;

/// Minimal AI snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveState {
    pub active_riders: u8,
    pub difficulty_level: u8,
    pub track_position: i64,
    pub frame_counter: u32,
}

impl SaveState {
    /// Reject snapshots no running system could have produced
    pub fn validate(&self) -> Result<(), AiError> {
        if usize::from(self.active_riders) > MAX_RIDERS {
            return Err(AiError::InvalidSnapshot("active rider count exceeds pool capacity"));
        }
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&self.difficulty_level) {
            return Err(AiError::InvalidSnapshot("difficulty level out of range"));
        }
        if self.track_position < 0 {
            return Err(AiError::InvalidSnapshot("negative track position"));
        }
        Ok(())
    }
}

/// Versioned wrapper written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub state: SaveState,
}

impl SaveEnvelope {
    pub fn new(state: SaveState) -> Self {
        Self {
            version: SAVE_VERSION,
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, AiError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse, check the version and validate the payload
    pub fn from_json(json: &str) -> Result<Self, AiError> {
        let envelope: SaveEnvelope = serde_json::from_str(json)?;
        if envelope.version != SAVE_VERSION {
            return Err(AiError::UnsupportedVersion {
                found: envelope.version,
                expected: SAVE_VERSION,
            });
        }
        envelope.state.validate()?;
        Ok(envelope)
    }
}

/// Write a snapshot to `path`
pub fn save(path: impl AsRef<Path>, state: &SaveState) -> Result<(), AiError> {
    let json = SaveEnvelope::new(*state).to_json()?;
    std::fs::write(path.as_ref(), json)?;
    log::info!("Saved AI snapshot to {}", path.as_ref().display());
    Ok(())
}

/// Read a snapshot from `path`
pub fn load(path: impl AsRef<Path>) -> Result<SaveState, AiError> {
    let json = std::fs::read_to_string(path.as_ref())?;
    let envelope = SaveEnvelope::from_json(&json)?;
    log::info!(
        "Loaded AI snapshot (frame {}, difficulty {})",
        envelope.state.frame_counter,
        envelope.state.difficulty_level
    );
    Ok(envelope.state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SaveState {
        SaveState {
            active_riders: 3,
            difficulty_level: 2,
            track_position: 4096,
            frame_counter: 1234,
        }
    }

    #[test]
    fn test_envelope_round_trip() {
        let json = SaveEnvelope::new(snapshot()).to_json().unwrap();
        let back = SaveEnvelope::from_json(&json).unwrap();
        assert_eq!(back.version, SAVE_VERSION);
        assert_eq!(back.state, snapshot());
    }

    #[test]
    fn test_rejects_future_version() {
        let json = r#"{"version": 7, "state": {"active_riders": 0, "difficulty_level": 1, "track_position": 0, "frame_counter": 0}}"#;
        match SaveEnvelope::from_json(json) {
            Err(AiError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, 7);
                assert_eq!(expected, SAVE_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_state() {
        let mut bad = snapshot();
        bad.active_riders = 9;
        assert!(matches!(bad.validate(), Err(AiError::InvalidSnapshot(_))));

        let mut bad = snapshot();
        bad.difficulty_level = 0;
        assert!(matches!(bad.validate(), Err(AiError::InvalidSnapshot(_))));

        let mut bad = snapshot();
        bad.track_position = -1;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(SaveEnvelope::from_json("{nope"), Err(AiError::Json(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("road-rivals-save-{}.json", std::process::id()));
        save(&path, &snapshot()).unwrap();
        assert_eq!(load(&path).unwrap(), snapshot());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("road-rivals-definitely-missing.json");
        assert!(matches!(load(path), Err(AiError::Io(_))));
    }
}
