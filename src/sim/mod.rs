//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-tick displacement only
//! - Seeded RNG only
//! - Stable brick iteration order (generation order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod kinematics;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{BrickCollision, Impact, PaddleBounce, resolve_bricks, resolve_paddle};
pub use kinematics::{Field, WallContact, advance};
pub use level::{BallConfig, GridSpec, Level, LevelDescriptor, PaddleConfig, generate};
pub use state::{Ball, Brick, BrickKind, GameEvent, Material, Paddle, RoundPhase, RoundState};
pub use tick::{TickInput, tick};
