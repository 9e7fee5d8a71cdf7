//! Variant configuration
//!
//! The shipped presentation variants differ only in layout constants and
//! whether restarts are gated on an ad obligation. Those differences live
//! here; the gameplay core is shared.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How the play square is placed inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Play square anchored at the container origin
    #[default]
    Viewport,
    /// Play square centered in the container
    CenteredBucket,
}

/// Per-variant game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Reference width the scale factor is derived from
    pub base_width: f32,
    /// Reference height the scale factor is derived from
    pub base_height: f32,
    pub layout_mode: LayoutMode,
    /// Gate restarts after a loss on the external ad obligation
    pub ad_gate: bool,
    /// Highest tier index the spawner may hand out
    pub start_max_index: usize,
    /// Minimum wall-clock interval between drops (ms)
    pub drop_cooldown_ms: f64,
    /// Sustained ceiling breach required to end the game (ms)
    pub overflow_grace_ms: f64,
    /// Downward gravity at scale 1.0 (pixels/s²)
    pub base_gravity: f32,
    /// One-time bonus for reaching the top tier
    pub completion_bonus: u64,
    /// Scale deltas below this are ignored
    pub scale_epsilon: f32,
    /// Scale deltas at or above this reset the session when pieces are live
    pub scale_reset_threshold: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_width: BASE_WIDTH,
            base_height: BASE_HEIGHT,
            layout_mode: LayoutMode::Viewport,
            ad_gate: true,
            start_max_index: START_MAX_INDEX,
            drop_cooldown_ms: DROP_COOLDOWN_MS,
            overflow_grace_ms: OVERFLOW_GRACE_MS,
            base_gravity: BASE_GRAVITY,
            completion_bonus: MAX_TIER_BONUS,
            scale_epsilon: SCALE_EPSILON,
            scale_reset_threshold: SCALE_RESET_THRESHOLD,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Centered-bucket variant without the ad gate
    pub fn centered() -> Self {
        Self {
            layout_mode: LayoutMode::CenteredBucket,
            ad_gate: false,
            ..Self::default()
        }
    }
}
