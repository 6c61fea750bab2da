//! Procedural level generation
//!
//! A level number picks a difficulty tier; the tier's grid is filled cell by
//! cell with random empty slots and material bricks.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Brick, BrickKind, Material};
use crate::consts::*;
use crate::settings::{DifficultyTier, GameSettings, Tier};

/// Grid parameters for a generated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: u32,
    pub cols: u32,
    pub empty_chance: f32,
    pub material_chance: f32,
}

/// What a level was built from (immutable for the round)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub level: u32,
    pub name: String,
    pub tier: Tier,
    /// `None` for handcrafted layouts
    pub grid: Option<GridSpec>,
    pub paddle_width: f32,
    pub ball_speed: f32,
}

impl LevelDescriptor {
    pub fn handcrafted(level: u32, name: &str, tier: Tier, paddle_width: f32, ball_speed: f32) -> Self {
        Self {
            level,
            name: name.to_string(),
            tier,
            grid: None,
            paddle_width,
            ball_speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddleConfig {
    pub width: f32,
    pub height: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallConfig {
    pub radius: f32,
    /// Base speed (pixels per tick)
    pub speed: f32,
}

/// A ready-to-play level: bricks plus paddle/ball starting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub descriptor: LevelDescriptor,
    pub bricks: Vec<Brick>,
    pub paddle: PaddleConfig,
    pub ball: BallConfig,
}

impl Level {
    /// Paddle/ball parameters from the settings with the given overrides
    pub fn configs(settings: &GameSettings, paddle_width: f32, ball_speed: f32) -> (PaddleConfig, BallConfig) {
        (
            PaddleConfig {
                width: paddle_width,
                height: settings.paddle_height,
                y: settings.paddle_y,
            },
            BallConfig {
                radius: settings.ball_radius,
                speed: ball_speed,
            },
        )
    }
}

/// Generate the level for `level` from the difficulty table
pub fn generate(level: u32, settings: &GameSettings, rng: &mut impl Rng) -> Level {
    let tier = settings.tier_for_level(level);
    let grid = grid_for_tier(&tier, settings.material_chance);
    let bricks = generate_grid(&grid, settings.canvas_width, rng);

    log::debug!(
        "Generated level {} ({} tier): {}x{} grid, {} bricks",
        level,
        tier.tier.as_str(),
        grid.rows,
        grid.cols,
        bricks.len()
    );

    let (paddle, ball) = Level::configs(settings, tier.paddle_width, tier.ball_speed);
    Level {
        descriptor: LevelDescriptor {
            level,
            name: format!("Level {}", level),
            tier: tier.tier,
            grid: Some(grid),
            paddle_width: tier.paddle_width,
            ball_speed: tier.ball_speed,
        },
        bricks,
        paddle,
        ball,
    }
}

pub fn grid_for_tier(tier: &DifficultyTier, material_chance: f32) -> GridSpec {
    GridSpec {
        rows: tier.rows,
        cols: tier.cols,
        empty_chance: tier.empty_chance,
        material_chance,
    }
}

/// Brick width that fits `cols` bricks (with gaps and side margins) in the field
pub fn brick_width_for(cols: u32, field_width: f32) -> f32 {
    if cols == 0 {
        return BRICK_MAX_WIDTH;
    }
    let available = field_width - 2.0 * BRICK_SIDE_MARGIN - (cols - 1) as f32 * BRICK_GAP;
    (available / cols as f32).clamp(1.0, BRICK_MAX_WIDTH)
}

/// Fill a grid, horizontally centered in the field
///
/// Two draws per cell: one against `empty_chance`, then (for kept cells)
/// one against `material_chance` followed by a uniform material pick.
pub fn generate_grid(grid: &GridSpec, field_width: f32, rng: &mut impl Rng) -> Vec<Brick> {
    let width = brick_width_for(grid.cols, field_width);
    let total_width = grid.cols as f32 * width + grid.cols.saturating_sub(1) as f32 * BRICK_GAP;
    let offset_left = (field_width - total_width) / 2.0;
    let size = Vec2::new(width, BRICK_HEIGHT);

    let mut bricks = Vec::with_capacity(grid.rows as usize * grid.cols as usize);
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            if rng.random::<f32>() < grid.empty_chance {
                continue;
            }

            let kind = if rng.random::<f32>() < grid.material_chance {
                let index = rng.random_range(0..Material::ALL.len());
                BrickKind::Material(Material::ALL[index])
            } else {
                BrickKind::Normal
            };

            let pos = Vec2::new(
                offset_left + col as f32 * (width + BRICK_GAP),
                BRICK_TOP_OFFSET + row as f32 * (BRICK_HEIGHT + BRICK_GAP),
            );
            bricks.push(Brick::new(pos, size, kind));
        }
    }
    bricks
}
