//! Brick Breaker - physics and rules engine for a brick breaker arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, collisions, round state machine, level generation)
//! - `scoring`: Brick points and star rating
//! - `progress`: Per-level progress records and stores
//! - `levels`: Handcrafted level catalog and game modes
//! - `driver`: Frame-driven game loop around the simulation
//! - `settings`: Data-driven game balance

pub mod driver;
pub mod levels;
pub mod progress;
pub mod scoring;
pub mod settings;
pub mod sim;

pub use driver::{FrameClock, GameDriver, InputProvider, Snapshot};
pub use progress::{LevelProgress, ProgressBook, ProgressStore};
pub use settings::{DifficultyTier, GameSettings, ScoreSettings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick (60 Hz, one tick per display frame)
    pub const TICK_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta fed to the clock (2 ticks worth)
    pub const MAX_FRAME_DT: f32 = 2.0 * TICK_DT;
    /// Frame gaps above this are treated as a pause and re-synced
    pub const STALL_THRESHOLD: f32 = 0.25;

    /// Play field dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Speed ceiling as a multiple of the round's base speed
    pub const MAX_SPEED_FACTOR: f32 = 2.0;

    /// Paddle defaults
    pub const PADDLE_HEIGHT: f32 = 20.0;
    pub const PADDLE_Y: f32 = 550.0;
    /// Maximum bounce angle off the paddle edge (60 degrees)
    pub const PADDLE_MAX_BOUNCE: f32 = std::f32::consts::FRAC_PI_3;

    /// Brick grid layout
    pub const BRICK_HEIGHT: f32 = 25.0;
    pub const BRICK_MAX_WIDTH: f32 = 80.0;
    pub const BRICK_GAP: f32 = 5.0;
    pub const BRICK_TOP_OFFSET: f32 = 60.0;
    pub const BRICK_SIDE_MARGIN: f32 = 20.0;

    /// Normalized offset beyond which both axes count as a corner hit
    pub const CORNER_THRESHOLD: f32 = 0.8;
    pub const EDGE_SPEEDUP: f32 = 1.05;
    pub const CORNER_SPEEDUP: f32 = 1.10;
    /// Ticks after a brick hit during which no brick collision is resolved
    pub const BRICK_COOLDOWN_TICKS: u32 = 5;

    /// Ticks between losing a life and the ball being re-docked
    pub const RESPAWN_DELAY_TICKS: u32 = 45;
    /// Launch direction is drawn within this angle of vertical (45 degrees)
    pub const MAX_LAUNCH_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    pub const STARTING_LIVES: u32 = 3;
}

/// Initialize logging for the current platform
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    }
}

/// Closest point to `p` inside the axis-aligned rectangle at `min` with `size`
#[inline]
pub fn closest_point_on_rect(p: Vec2, min: Vec2, size: Vec2) -> Vec2 {
    p.clamp(min, min + size)
}

/// Rescale a velocity to the given speed, keeping its direction
#[inline]
pub fn with_speed(vel: Vec2, speed: f32) -> Vec2 {
    vel.normalize_or_zero() * speed
}
