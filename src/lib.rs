//! Pomelo Drop - a fruit-merging drop puzzle core
//!
//! Core modules:
//! - `sim`: Deterministic gameplay (spawning, merging, containment, overflow)
//! - `physics`: Rigid-body engine boundary (rapier2d)
//! - `config`: Data-driven variant configuration
//! - `tiers`: Static fruit tier catalog
//! - `storage`: Best-score and ad-obligation persistence

pub mod config;
pub mod physics;
pub mod sim;
pub mod storage;
pub mod tiers;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{GameConfig, LayoutMode};
pub use sim::{Game, GamePhase, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching the browser frame clock)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Reference play-square dimensions; all geometry scales from these
    pub const BASE_WIDTH: f32 = 390.0;
    pub const BASE_HEIGHT: f32 = 390.0;
    /// Downward gravity at scale 1.0 (pixels/s²)
    pub const BASE_GRAVITY: f32 = 1400.0;

    /// Highest tier the spawner may hand out
    pub const START_MAX_INDEX: usize = 3;
    /// Minimum wall-clock interval between drops (ms)
    pub const DROP_COOLDOWN_MS: f64 = 260.0;
    /// Sustained ceiling breach required to end the game (ms)
    pub const OVERFLOW_GRACE_MS: f64 = 900.0;
    /// One-time bonus for reaching the top tier
    pub const MAX_TIER_BONUS: u64 = 600;

    /// Scale deltas below this are ignored entirely
    pub const SCALE_EPSILON: f32 = 0.02;
    /// Scale deltas at or above this force a session reset when pieces are live
    pub const SCALE_RESET_THRESHOLD: f32 = 0.1;

    /// Bucket interior width as a fraction of the play square
    pub const BUCKET_WIDTH_RATIO: f32 = 0.9;
    pub const BUCKET_MARGIN_RATIO: f32 = 0.02;
    pub const WALL_THICKNESS_RATIO: f32 = 0.05;

    /// Base lengths, multiplied by the current scale
    pub const FLOOR_INSET_BASE: f32 = 34.0;
    pub const DROP_GAP_BASE: f32 = 36.0;
    pub const DROP_PADDING_BASE: f32 = 8.0;
    pub const MIN_CEILING_BASE: f32 = 56.0;
    /// Ceiling target as a fraction of play height
    pub const CEILING_RATIO: f32 = 0.14;
}

/// Clamp that tolerates an inverted range (returns `max` when `min > max`)
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
