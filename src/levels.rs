//! Handcrafted level catalog and game modes
//!
//! Each mode is a numbered list of levels. A level is handcrafted when the
//! catalog has an entry for it, otherwise it is generated from the
//! difficulty table (in modes that allow that). Brick Mania has handcrafted
//! levels 1-6 and checkpoints at 21, 31, 34, 39 and 90.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{GameSettings, Tier};
use crate::sim::{self, Brick, BrickKind, Level, LevelDescriptor, Material};

/// Errors from looking up a level
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("{mode} has no level {level}")]
    UnknownLevel { mode: &'static str, level: u32 },

    #[error("{mode} has no level after {level}")]
    LastLevel { mode: &'static str, level: u32 },
}

/// Difficulty label shown for handcrafted levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Master,
}

impl Difficulty {
    pub fn tier(&self) -> Tier {
        match self {
            Difficulty::Easy => Tier::Easy,
            Difficulty::Medium => Tier::Medium,
            Difficulty::Hard => Tier::Hard,
            Difficulty::Expert | Difficulty::Master => Tier::Expert,
        }
    }
}

/// One brick in a handcrafted layout (top-left corner and size)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickSpec {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub material: Option<Material>,
}

const fn brick(x: f32, y: f32) -> BrickSpec {
    BrickSpec {
        x,
        y,
        width: 80.0,
        height: 30.0,
        material: None,
    }
}

const fn material(x: f32, y: f32, material: Material) -> BrickSpec {
    BrickSpec {
        x,
        y,
        width: 80.0,
        height: 30.0,
        material: Some(material),
    }
}

/// A handcrafted level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelConfig {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub paddle_width: f32,
    pub ball_speed: f32,
    pub bricks: &'static [BrickSpec],
}

impl LevelConfig {
    /// Build a playable level; bricks are clipped to the field width
    pub fn build(&self, settings: &GameSettings) -> Level {
        let bricks = self
            .bricks
            .iter()
            .filter(|spec| spec.x >= 0.0 && spec.x + spec.width <= settings.canvas_width)
            .map(|spec| {
                let kind = spec.material.map(BrickKind::Material).unwrap_or_default();
                Brick::new(
                    Vec2::new(spec.x, spec.y),
                    Vec2::new(spec.width, spec.height),
                    kind,
                )
            })
            .collect();

        let (paddle, ball) = Level::configs(settings, self.paddle_width, self.ball_speed);
        Level {
            descriptor: LevelDescriptor::handcrafted(
                self.id,
                self.name,
                self.difficulty.tier(),
                self.paddle_width,
                self.ball_speed,
            ),
            bricks,
            paddle,
            ball,
        }
    }
}

pub const BRICK_MANIA: &[LevelConfig] = &[
    LevelConfig {
        id: 1,
        name: "First Steps",
        description: "Break these simple bricks to get started.",
        difficulty: Difficulty::Easy,
        paddle_width: 120.0,
        ball_speed: 4.0,
        bricks: &[
            brick(300.0, 100.0),
            brick(400.0, 100.0),
            brick(500.0, 100.0),
            brick(350.0, 150.0),
            brick(450.0, 150.0),
        ],
    },
    LevelConfig {
        id: 2,
        name: "Double Trouble",
        description: "Two rows of bricks to test your skills.",
        difficulty: Difficulty::Easy,
        paddle_width: 120.0,
        ball_speed: 4.0,
        bricks: &[
            brick(200.0, 100.0),
            brick(300.0, 100.0),
            brick(400.0, 100.0),
            brick(500.0, 100.0),
            brick(600.0, 100.0),
            brick(200.0, 150.0),
            brick(300.0, 150.0),
            brick(400.0, 150.0),
            brick(500.0, 150.0),
            brick(600.0, 150.0),
        ],
    },
    LevelConfig {
        id: 3,
        name: "Triangle Formation",
        description: "Bricks arranged in a triangular pattern.",
        difficulty: Difficulty::Easy,
        paddle_width: 120.0,
        ball_speed: 4.0,
        bricks: &[
            brick(400.0, 100.0),
            brick(350.0, 150.0),
            brick(450.0, 150.0),
            brick(300.0, 200.0),
            brick(400.0, 200.0),
            brick(500.0, 200.0),
        ],
    },
    LevelConfig {
        id: 4,
        name: "Bronze Descent",
        description: "An inverted pyramid with your first material bricks.",
        difficulty: Difficulty::Medium,
        paddle_width: 110.0,
        ball_speed: 3.7,
        bricks: &[
            brick(200.0, 80.0),
            brick(300.0, 80.0),
            brick(400.0, 80.0),
            brick(500.0, 80.0),
            brick(600.0, 80.0),
            brick(250.0, 120.0),
            material(350.0, 120.0, Material::Bronze),
            brick(450.0, 120.0),
            material(400.0, 160.0, Material::Bronze),
        ],
    },
    LevelConfig {
        id: 5,
        name: "The Gateway",
        description: "A narrowing gate of three colours.",
        difficulty: Difficulty::Easy,
        paddle_width: 120.0,
        ball_speed: 4.0,
        bricks: &[
            brick(300.0, 100.0),
            brick(400.0, 100.0),
            brick(500.0, 100.0),
            brick(350.0, 150.0),
            brick(450.0, 150.0),
            brick(400.0, 200.0),
        ],
    },
    LevelConfig {
        id: 6,
        name: "Ring of Fire",
        description: "A circular ring of bricks with a volatile core.",
        difficulty: Difficulty::Medium,
        paddle_width: 100.0,
        ball_speed: 4.2,
        bricks: &[
            // Outer ring
            material(300.0, 100.0, Material::Bronze),
            material(380.0, 80.0, Material::Bronze),
            material(460.0, 80.0, Material::Bronze),
            material(540.0, 100.0, Material::Bronze),
            material(560.0, 180.0, Material::Bronze),
            material(460.0, 220.0, Material::Bronze),
            material(380.0, 220.0, Material::Bronze),
            material(280.0, 180.0, Material::Bronze),
            // Inner cross
            material(380.0, 150.0, Material::Iron),
            material(460.0, 150.0, Material::Iron),
            material(420.0, 120.0, Material::Iron),
            material(420.0, 180.0, Material::Iron),
            // Core
            brick(420.0, 150.0),
        ],
    },
    LevelConfig {
        id: 21,
        name: "Level 21",
        description: "Level 21 - Ready for challenge!",
        difficulty: Difficulty::Easy,
        paddle_width: 140.0,
        ball_speed: 3.0,
        bricks: FIVE_IN_A_ROW,
    },
    LevelConfig {
        id: 31,
        name: "Level 31",
        description: "Level 31 - Ready for challenge!",
        difficulty: Difficulty::Easy,
        paddle_width: 140.0,
        ball_speed: 3.0,
        bricks: FIVE_IN_A_ROW,
    },
    LevelConfig {
        id: 34,
        name: "Level 34",
        description: "Level 34 - Ready for challenge!",
        difficulty: Difficulty::Easy,
        paddle_width: 140.0,
        ball_speed: 3.0,
        bricks: FIVE_IN_A_ROW,
    },
    LevelConfig {
        id: 39,
        name: "Level 39",
        description: "Level 39 - Ready for challenge!",
        difficulty: Difficulty::Easy,
        paddle_width: 140.0,
        ball_speed: 3.0,
        bricks: FIVE_IN_A_ROW,
    },
    LevelConfig {
        id: 90,
        name: "Level 90",
        description: "Level 90 - Ready for challenge!",
        difficulty: Difficulty::Easy,
        paddle_width: 140.0,
        ball_speed: 3.0,
        bricks: FIVE_IN_A_ROW,
    },
];

/// Single row used by the later Brick Mania checkpoints
const FIVE_IN_A_ROW: &[BrickSpec] = &[
    brick(200.0, 100.0),
    brick(300.0, 100.0),
    brick(400.0, 100.0),
    brick(500.0, 100.0),
    brick(600.0, 100.0),
];

pub const CHALLENGE_EASY: &[LevelConfig] = &[LevelConfig {
    id: 1,
    name: "Easy Challenge 1",
    description: "A gentle start for challenge mode.",
    difficulty: Difficulty::Easy,
    paddle_width: 130.0,
    ball_speed: 3.5,
    bricks: &[
        brick(320.0, 120.0),
        brick(420.0, 120.0),
        brick(520.0, 120.0),
        brick(370.0, 170.0),
        brick(470.0, 170.0),
        material(400.0, 220.0, Material::Gold),
    ],
}];

pub const CHALLENGE_MEDIUM: &[LevelConfig] = &[LevelConfig {
    id: 1,
    name: "Medium Challenge 1",
    description: "A step up in challenge.",
    difficulty: Difficulty::Medium,
    paddle_width: 110.0,
    ball_speed: 4.5,
    bricks: &[
        brick(300.0, 100.0),
        brick(400.0, 100.0),
        brick(500.0, 100.0),
        brick(350.0, 150.0),
        brick(450.0, 150.0),
        brick(400.0, 200.0),
    ],
}];

pub const CHALLENGE_HARD: &[LevelConfig] = &[LevelConfig {
    id: 1,
    name: "Hard Challenge 1",
    description: "A tough start for hard mode.",
    difficulty: Difficulty::Hard,
    paddle_width: 90.0,
    ball_speed: 5.5,
    bricks: &[
        brick(320.0, 100.0),
        brick(400.0, 100.0),
        brick(480.0, 100.0),
        brick(360.0, 150.0),
        brick(440.0, 150.0),
        brick(400.0, 200.0),
    ],
}];

pub const TROPHY_ROAD: &[LevelConfig] = &[LevelConfig {
    id: 1,
    name: "Endless Start",
    description: "The endless journey begins. Survive as long as you can!",
    difficulty: Difficulty::Medium,
    paddle_width: 110.0,
    ball_speed: 5.0,
    bricks: &[
        brick(300.0, 100.0),
        brick(400.0, 100.0),
        brick(500.0, 100.0),
        brick(350.0, 150.0),
        brick(450.0, 150.0),
        brick(400.0, 200.0),
    ],
}];

/// Number of levels in Brick Mania
pub const BRICK_MANIA_LEVELS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Game modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// 100 levels: handcrafted openers, generated after that
    BrickMania,
    /// Short handcrafted lists
    Challenge(ChallengeDifficulty),
    /// Endless; generated after the opener
    TrophyRoad,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::BrickMania => "Brick Mania",
            Mode::Challenge(ChallengeDifficulty::Easy) => "Challenge Easy",
            Mode::Challenge(ChallengeDifficulty::Medium) => "Challenge Medium",
            Mode::Challenge(ChallengeDifficulty::Hard) => "Challenge Hard",
            Mode::TrophyRoad => "Trophy Road",
        }
    }

    /// Key the mode's progress book is stored under
    pub fn storage_key(&self) -> &'static str {
        match self {
            Mode::BrickMania => "brickBreakerProgress",
            Mode::Challenge(ChallengeDifficulty::Easy) => "challengeEasyProgress",
            Mode::Challenge(ChallengeDifficulty::Medium) => "challengeMediumProgress",
            Mode::Challenge(ChallengeDifficulty::Hard) => "challengeHardProgress",
            Mode::TrophyRoad => "trophyRoadProgress",
        }
    }

    pub fn catalog(&self) -> &'static [LevelConfig] {
        match self {
            Mode::BrickMania => BRICK_MANIA,
            Mode::Challenge(ChallengeDifficulty::Easy) => CHALLENGE_EASY,
            Mode::Challenge(ChallengeDifficulty::Medium) => CHALLENGE_MEDIUM,
            Mode::Challenge(ChallengeDifficulty::Hard) => CHALLENGE_HARD,
            Mode::TrophyRoad => TROPHY_ROAD,
        }
    }

    /// Number of levels, `None` for endless modes
    pub fn level_count(&self) -> Option<u32> {
        match self {
            Mode::BrickMania => Some(BRICK_MANIA_LEVELS),
            Mode::Challenge(_) => Some(self.catalog().len() as u32),
            Mode::TrophyRoad => None,
        }
    }

    pub fn has_level(&self, level: u32) -> bool {
        level >= 1 && self.level_count().is_none_or(|count| level <= count)
    }

    /// Build a level: the catalog entry if there is one, otherwise generated
    pub fn level(&self, level: u32, settings: &GameSettings, rng: &mut impl Rng) -> Result<Level, LevelError> {
        if !self.has_level(level) {
            return Err(LevelError::UnknownLevel {
                mode: self.as_str(),
                level,
            });
        }
        match self.catalog().iter().find(|config| config.id == level) {
            Some(config) => Ok(config.build(settings)),
            None => Ok(sim::generate(level, settings, rng)),
        }
    }
}
