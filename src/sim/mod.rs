//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied elapsed time, clamped to a bounded frame scale
//! - Seeded RNG only
//! - Stable iteration order (player first, then pursuers by index)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod direction;
pub mod maze;
pub mod motion;
pub mod state;
pub mod tick;

pub use ai::{Goal, TargetContext};
pub use collision::Contact;
pub use direction::Direction;
pub use maze::{Cell, Maze};
pub use motion::{Body, StepOutcome};
pub use state::{
    GameEvent, GameState, GameStatus, Personality, Player, PlayerView, PowerMode, Pursuer,
    PursuerMode, PursuerView, Snapshot,
};
pub use tick::{frame_scale, tick};
