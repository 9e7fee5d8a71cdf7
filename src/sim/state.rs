//! Session state and core gameplay types

use rapier2d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

use super::layout::PlayArea;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Intro overlay is up; interaction is blocked and physics is frozen
    Intro,
    /// Active gameplay
    Playing,
    /// Session ended; Reset is the only way out
    GameOver,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A piece stayed above the ceiling line past the grace period
    Overflow,
    /// The top tier was produced (a win)
    Max,
}

/// Side-table entry for one live piece.
///
/// The physics engine owns geometry and integration; the core owns only the
/// tier tag, the creation-time radius, and the per-tick merge-dedup flag.
#[derive(Debug, Clone, Copy)]
pub struct Piece {
    pub handle: RigidBodyHandle,
    pub tier: usize,
    pub radius: f32,
    pub merging: bool,
}

/// Read-only piece view for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PieceView {
    pub tier: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Mutable session state owned by the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    /// Highest score ever reached; persisted on every increase
    pub best_score: u64,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    /// Tier the next drop will spawn
    pub current_tier: usize,
    /// Tier queued after that
    pub next_tier: usize,
    /// When the current sustained ceiling breach began (ms)
    pub danger_since: Option<f64>,
}

/// Read-only snapshot handed to the host for rendering/binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: u64,
    pub best_score: u64,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    pub current_tier: usize,
    pub next_tier: usize,
    /// Horizontal aim position of the pending drop
    pub drag_x: f32,
    /// Where the next piece will appear
    pub preview_drop_y: f32,
    pub play_area: PlayArea,
}
