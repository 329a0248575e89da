//! Errors raised at the I/O edges (tuning files, save snapshots)
//!
//! The simulation itself never fails: everything inside a tick is a clamp
//! or a no-op.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(&'static str),
}
