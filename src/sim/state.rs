//! Round state and core simulation types
//!
//! Everything the renderer and persistence collaborators read lives here.
//! `RoundState` is the single mutable aggregate advanced by `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{Level, LevelDescriptor};
use crate::consts::*;
use crate::scoring;
use crate::settings::GameSettings;
use crate::with_speed;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Ball docked above the paddle, waiting for launch input
    Ready,
    /// Active simulation
    Playing,
    /// Every brick destroyed (terminal)
    Won,
    /// All lives lost (terminal)
    Failed,
}

impl RoundPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoundPhase::Won | RoundPhase::Failed)
    }
}

/// The ball
///
/// `vel` is a per-tick displacement. While moving, `vel.length() == speed`
/// and `base_speed <= speed <= 2 * base_speed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub base_speed: f32,
}

impl Ball {
    /// A stationary ball at `pos`
    pub fn new(pos: Vec2, radius: f32, base_speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            speed: base_speed,
            base_speed,
        }
    }

    /// Upper speed bound for this ball
    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.base_speed * MAX_SPEED_FACTOR
    }

    pub fn is_moving(&self) -> bool {
        self.vel != Vec2::ZERO
    }

    /// Set speed (clamped to the allowed band) and rescale velocity to match
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(self.base_speed, self.max_speed());
        self.vel = with_speed(self.vel, self.speed);
    }

    /// Point the ball at `angle` radians from straight up (positive = right)
    pub fn aim(&mut self, angle: f32) {
        self.vel = Vec2::new(angle.sin(), -angle.cos()) * self.speed;
    }

    /// Sit the ball on top of the paddle, centered and stationary
    pub fn dock(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.y - self.radius);
        self.vel = Vec2::ZERO;
        self.speed = self.base_speed;
    }
}

/// The player's paddle (`x` is the left edge, `y` the top edge)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// A paddle centered horizontally in a field of `field_width`
    pub fn centered(field_width: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x: ((field_width - width) / 2.0).max(0.0),
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Move so the paddle center sits at `target_x`, clamped to the field
    pub fn move_to(&mut self, target_x: f32, field_width: f32) {
        self.x = target_x - self.width / 2.0;
        self.clamp_to(field_width);
    }

    /// Enforce `0 <= x <= field_width - width`
    pub fn clamp_to(&mut self, field_width: f32) {
        let max_x = (field_width - self.width).max(0.0);
        self.x = if self.x.is_finite() {
            self.x.clamp(0.0, max_x)
        } else {
            max_x / 2.0
        };
    }
}

/// Material variants, each with its own point value and colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Bronze,
    Iron,
    Copper,
    Silver,
    Gold,
    Emerald,
    Sapphire,
    Ruby,
}

impl Material {
    pub const ALL: [Material; 8] = [
        Material::Bronze,
        Material::Iron,
        Material::Copper,
        Material::Silver,
        Material::Gold,
        Material::Emerald,
        Material::Sapphire,
        Material::Ruby,
    ];
}

/// Brick category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickKind {
    #[default]
    Normal,
    Material(Material),
}

impl BrickKind {
    pub fn material(&self) -> Option<Material> {
        match self {
            BrickKind::Normal => None,
            BrickKind::Material(m) => Some(*m),
        }
    }
}

/// A brick (`pos` is the top-left corner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: BrickKind,
    pub hits: u32,
    pub max_hits: u32,
    pub destroyed: bool,
}

impl Brick {
    pub fn new(pos: Vec2, size: Vec2, kind: BrickKind) -> Self {
        Self {
            pos,
            size,
            kind,
            hits: 0,
            max_hits: 1,
            destroyed: false,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Count a hit; returns true if this hit destroyed the brick
    pub fn register_hit(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.hits += 1;
        if self.hits >= self.max_hits {
            self.destroyed = true;
        }
        self.destroyed
    }
}

/// Events emitted by the simulation for renderers, effects and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BallLaunched,
    WallBounce,
    PaddleBounce { hit_pos: f32 },
    /// Brick hit but not destroyed
    BrickHit { index: usize },
    BrickDestroyed {
        index: usize,
        kind: BrickKind,
        points: u64,
        position: Vec2,
    },
    LifeLost { lives_left: u32 },
    /// Ball and paddle returned to the start-of-round layout
    BallReset,
    RoundWon { score: u64, stars: u8 },
    RoundFailed { score: u64 },
}

/// Complete state of one round (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// Round seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Level number
    pub level: u32,
    pub descriptor: LevelDescriptor,
    pub phase: RoundPhase,
    pub score: u64,
    pub lives: u32,
    pub starting_lives: u32,
    /// Star rating, set when the round is won
    pub stars: u8,
    pub ball: Ball,
    pub paddle: Paddle,
    /// Bricks in generation order (collision iteration order)
    pub bricks: Vec<Brick>,
    /// Ticks left before brick collisions resolve again
    pub brick_cooldown: u32,
    /// Ticks left before the ball is re-docked after a life loss
    pub respawn_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced since the last drain
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl RoundState {
    /// Start a round on `level`; the ball starts docked on a centered paddle
    pub fn new(level: Level, settings: &GameSettings, seed: u64) -> Self {
        let Level {
            descriptor,
            bricks,
            paddle,
            ball,
        } = level;
        let paddle = Paddle::centered(settings.canvas_width, paddle.y, paddle.width, paddle.height);
        let mut round_ball = Ball::new(Vec2::ZERO, ball.radius, ball.speed);
        round_ball.dock(&paddle);

        log::info!(
            "Level {} ({}): {} bricks, paddle {}, speed {}",
            descriptor.level,
            descriptor.name,
            bricks.len(),
            paddle.width,
            ball.speed
        );

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: descriptor.level,
            descriptor,
            phase: RoundPhase::Ready,
            score: 0,
            lives: settings.lives,
            starting_lives: settings.lives,
            stars: 0,
            ball: round_ball,
            paddle,
            bricks,
            brick_cooldown: 0,
            respawn_ticks: 0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Round RNG (launch angles)
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn total_bricks(&self) -> usize {
        self.bricks.len()
    }

    pub fn remaining_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| !b.destroyed).count()
    }

    /// True when every brick is destroyed (vacuously true for an empty level)
    pub fn all_bricks_destroyed(&self) -> bool {
        self.bricks.iter().all(|b| b.destroyed)
    }

    /// Put the paddle back in the middle and dock the ball on it
    pub fn reset_ball_and_paddle(&mut self, field_width: f32) {
        self.paddle = Paddle::centered(field_width, self.paddle.y, self.paddle.width, self.paddle.height);
        self.ball.dock(&self.paddle);
        self.brick_cooldown = 0;
    }

    /// Enter `Won`, rate the round and emit the event
    pub fn win(&mut self, settings: &GameSettings) {
        self.phase = RoundPhase::Won;
        self.stars = scoring::star_rating(
            self.score,
            self.lives,
            self.total_bricks(),
            self.starting_lives,
            &settings.score,
        );
        self.ball.vel = Vec2::ZERO;
        log::info!(
            "Level {} won: score {}, lives {}, {} stars",
            self.level,
            self.score,
            self.lives,
            self.stars
        );
        self.push_event(GameEvent::RoundWon {
            score: self.score,
            stars: self.stars,
        });
    }

    /// Handle a ball-lost event: lose a life, then either fail or wait to re-dock
    pub fn lose_ball(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.ball.vel = Vec2::ZERO;
        self.push_event(GameEvent::LifeLost {
            lives_left: self.lives,
        });

        if self.lives == 0 {
            self.phase = RoundPhase::Failed;
            log::info!("Level {} failed: score {}", self.level, self.score);
            self.push_event(GameEvent::RoundFailed { score: self.score });
        } else {
            log::debug!("Life lost, {} remaining", self.lives);
            self.phase = RoundPhase::Ready;
            self.respawn_ticks = RESPAWN_DELAY_TICKS;
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
