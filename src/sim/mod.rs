//! Deterministic rider simulation
//!
//! All AI gameplay logic lives here. This module must stay deterministic:
//! - Fixed frame step only
//! - Injected random source only
//! - Integer and fixed-point arithmetic only
//! - Stable iteration order (slot index, or the distance order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod decision;
pub mod difficulty;
pub mod fixed;
pub mod performance;
pub mod physics;
pub mod random;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{AttackOutcome, PlayerCollision, StrikeOutcome};
pub use difficulty::Difficulty;
pub use fixed::Fx16;
pub use performance::{PerformanceManager, UpdateTier};
pub use random::{RandomSource, seeded};
pub use spawn::{LevelType, SpawnPoint, Spawner};
pub use state::{AiStats, Personality, Profile, Rider, RiderId, RiderPool, RiderState, UpdateOrder};
pub use tick::AiSystem;
pub use world::{Player, World};
