//! Game settings and balance tables
//!
//! Immutable once loaded; passed by reference into the level generator,
//! the round state machine and the scoring functions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::Material;

/// Errors from loading a settings document
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Difficulty table is empty")]
    NoTiers,

    #[error("{tier} tier grid {rows}x{cols} exceeds {max}x{max}")]
    GridTooLarge {
        tier: &'static str,
        rows: u32,
        cols: u32,
        max: u32,
    },
}

/// Largest row or column count a difficulty tier may use
pub const MAX_GRID_DIM: u32 = 64;

/// Difficulty tier names, each harder than the last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Tier {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
            Tier::Expert => "Expert",
        }
    }
}

/// One row of the difficulty table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub tier: Tier,
    /// First level number this tier applies to
    pub first_level: u32,
    pub rows: u32,
    pub cols: u32,
    pub paddle_width: f32,
    /// Probability a grid cell is left empty
    pub empty_chance: f32,
    /// Recommended base ball speed (pixels per tick)
    pub ball_speed: f32,
}

impl DifficultyTier {
    /// The entry tier, also used when a settings file carries no table
    pub fn easy() -> Self {
        Self {
            tier: Tier::Easy,
            first_level: 1,
            rows: 4,
            cols: 7,
            paddle_width: 120.0,
            empty_chance: 0.3,
            ball_speed: 6.0,
        }
    }
}

/// Display and score data for a material brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub name: String,
    pub color: String,
    pub points: u64,
}

/// Score table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSettings {
    /// Points for a normal brick
    pub normal_brick: u64,
    pub normal_brick_color: String,
    /// Bonus per remaining life when rating a round
    pub life_bonus: u64,
    pub materials: BTreeMap<Material, MaterialInfo>,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        let materials = [
            (Material::Bronze, "Bronze", "#b45309", 50),
            (Material::Iron, "Iron", "#6b7280", 60),
            (Material::Copper, "Copper", "#c2410c", 65),
            (Material::Silver, "Silver", "#d1d5db", 70),
            (Material::Gold, "Gold", "#facc15", 100),
            (Material::Emerald, "Emerald", "#22c55e", 120),
            (Material::Sapphire, "Sapphire", "#3b82f6", 130),
            (Material::Ruby, "Ruby", "#ef4444", 150),
        ]
        .into_iter()
        .map(|(material, name, color, points)| {
            (
                material,
                MaterialInfo {
                    name: name.to_string(),
                    color: color.to_string(),
                    points,
                },
            )
        })
        .collect();

        Self {
            normal_brick: 10,
            normal_brick_color: "#4B9CD3".to_string(),
            life_bonus: 500,
            materials,
        }
    }
}

impl ScoreSettings {
    /// Points for destroying a brick of the given material (`None` = normal)
    pub fn points_for(&self, material: Option<Material>) -> u64 {
        match material {
            None => self.normal_brick,
            Some(m) => self
                .materials
                .get(&m)
                .map(|info| info.points)
                .unwrap_or(self.normal_brick),
        }
    }

    /// Display colour for a brick of the given material
    pub fn color_for(&self, material: Option<Material>) -> &str {
        material
            .and_then(|m| self.materials.get(&m))
            .map(|info| info.color.as_str())
            .unwrap_or(&self.normal_brick_color)
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    // === Field ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Ball / paddle ===
    pub ball_radius: f32,
    pub paddle_height: f32,
    pub paddle_y: f32,

    // === Round ===
    pub lives: u32,
    /// Chance a generated brick is a material brick
    pub material_chance: f32,

    // === Tables ===
    pub difficulty: Vec<DifficultyTier>,
    pub score: ScoreSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            ball_radius: BALL_RADIUS,
            paddle_height: PADDLE_HEIGHT,
            paddle_y: PADDLE_Y,

            lives: STARTING_LIVES,
            material_chance: 0.3,

            difficulty: vec![
                DifficultyTier::easy(),
                DifficultyTier {
                    tier: Tier::Medium,
                    first_level: 26,
                    rows: 6,
                    cols: 8,
                    paddle_width: 100.0,
                    empty_chance: 0.25,
                    ball_speed: 6.5,
                },
                DifficultyTier {
                    tier: Tier::Hard,
                    first_level: 51,
                    rows: 8,
                    cols: 10,
                    paddle_width: 80.0,
                    empty_chance: 0.2,
                    ball_speed: 7.0,
                },
                DifficultyTier {
                    tier: Tier::Expert,
                    first_level: 76,
                    rows: 10,
                    cols: 12,
                    paddle_width: 70.0,
                    empty_chance: 0.15,
                    ball_speed: 7.5,
                },
            ],
            score: ScoreSettings::default(),
        }
    }
}

impl GameSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: GameSettings = serde_json::from_str(json)?;
        if settings.difficulty.is_empty() {
            return Err(SettingsError::NoTiers);
        }
        if let Some(tier) = settings
            .difficulty
            .iter()
            .find(|t| t.rows > MAX_GRID_DIM || t.cols > MAX_GRID_DIM)
        {
            return Err(SettingsError::GridTooLarge {
                tier: tier.tier.as_str(),
                rows: tier.rows,
                cols: tier.cols,
                max: MAX_GRID_DIM,
            });
        }
        settings.difficulty.sort_by_key(|t| t.first_level);
        log::info!(
            "Loaded settings ({} difficulty tiers)",
            settings.difficulty.len()
        );
        Ok(settings)
    }

    /// Difficulty tier for a level number (the last tier whose bracket has started)
    pub fn tier_for_level(&self, level: u32) -> DifficultyTier {
        self.difficulty
            .iter()
            .rev()
            .find(|t| t.first_level <= level)
            .or_else(|| self.difficulty.first())
            .cloned()
            .unwrap_or_else(DifficultyTier::easy)
    }
}
