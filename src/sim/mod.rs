//! Deterministic gameplay core
//!
//! All gameplay logic lives here, on top of the physics boundary:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Wall-clock inputs passed in by the caller, never read ambiently
//! - No rendering or platform dependencies

pub mod layout;
pub mod state;
pub mod tick;

pub use layout::{Layout, PlayArea, Rescale};
pub use state::{EndReason, GamePhase, Piece, PieceView, SessionState, Snapshot};
pub use tick::Game;
