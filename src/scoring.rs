//! Scoring and star rating
//!
//! Score accumulates per destroyed brick. At the end of a won round the score
//! plus a bonus for every life left is compared against the round's reference
//! total and turned into 1-3 stars.

use crate::progress::LevelProgress;
use crate::settings::ScoreSettings;
use crate::sim::BrickKind;

/// Rating fraction for three stars
pub const THREE_STAR_THRESHOLD: f64 = 0.9;
/// Rating fraction for two stars
pub const TWO_STAR_THRESHOLD: f64 = 0.7;
pub const MAX_STARS: u8 = 3;

/// Points for destroying a brick
pub fn brick_points(kind: BrickKind, score: &ScoreSettings) -> u64 {
    score.points_for(kind.material())
}

/// `(score + lives * bonus) / (bricks * base value + starting lives * bonus)`
///
/// May exceed 1.0 when material bricks push the score past the reference.
pub fn rating_percentage(
    score: u64,
    lives: u32,
    total_bricks: usize,
    starting_lives: u32,
    settings: &ScoreSettings,
) -> f64 {
    let earned = score as f64 + lives as f64 * settings.life_bonus as f64;
    let reference = total_bricks as f64 * settings.normal_brick as f64
        + starting_lives as f64 * settings.life_bonus as f64;
    if reference <= 0.0 {
        return 1.0;
    }
    earned / reference
}

/// Star rating for a won round (1-3)
pub fn star_rating(
    score: u64,
    lives: u32,
    total_bricks: usize,
    starting_lives: u32,
    settings: &ScoreSettings,
) -> u8 {
    let percentage = rating_percentage(score, lives, total_bricks, starting_lives, settings);
    if percentage >= THREE_STAR_THRESHOLD {
        3
    } else if percentage >= TWO_STAR_THRESHOLD {
        2
    } else {
        1
    }
}

/// Keep the better of a stored record and a new result; never regresses
pub fn merge_progress(previous: &LevelProgress, score: u64, stars: u8) -> LevelProgress {
    LevelProgress {
        score: previous.score.max(score),
        stars: previous.stars.max(stars.min(MAX_STARS)),
        unlocked: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Material;

    #[test]
    fn test_brick_points() {
        let score = ScoreSettings::default();
        assert_eq!(brick_points(BrickKind::Normal, &score), 10);
        assert_eq!(brick_points(BrickKind::Material(Material::Sapphire), &score), 130);
        assert_eq!(brick_points(BrickKind::Material(Material::Bronze), &score), 50);
    }

    #[test]
    fn test_rating_above_one_is_three_stars() {
        let score = ScoreSettings::default();
        let pct = rating_percentage(700, 3, 10, 3, &score);
        assert!((pct - 1.375).abs() < 1e-9);
        assert_eq!(star_rating(700, 3, 10, 3, &score), 3);
    }

    #[test]
    fn test_rating_thresholds() {
        let score = ScoreSettings::default();
        // Reference: 20 bricks * 10 + 3 * 500 = 1700
        // 1 life, all normal bricks: (200 + 500) / 1700 = 0.41 -> 1 star
        assert_eq!(star_rating(200, 1, 20, 3, &score), 1);
        // 2 lives: (200 + 1000) / 1700 = 0.705 -> 2 stars
        assert_eq!(star_rating(200, 2, 20, 3, &score), 2);
        // Exactly 0.9: 1530 / 1700
        assert_eq!(star_rating(530, 2, 20, 3, &score), 3);
        // Just below 0.7: 1189 / 1700
        assert_eq!(star_rating(189, 2, 20, 3, &score), 1);
    }

    #[test]
    fn test_rating_empty_reference() {
        let score = ScoreSettings::default();
        assert_eq!(star_rating(0, 0, 0, 0, &score), 3);
    }

    #[test]
    fn test_merge_never_regresses() {
        let previous = LevelProgress {
            score: 900,
            stars: 3,
            unlocked: true,
        };
        let merged = merge_progress(&previous, 400, 1);
        assert_eq!(merged.score, 900);
        assert_eq!(merged.stars, 3);

        let merged = merge_progress(&merged, 1200, 2);
        assert_eq!(merged.score, 1200);
        assert_eq!(merged.stars, 3);
    }

    #[test]
    fn test_merge_caps_stars() {
        let merged = merge_progress(&LevelProgress::default(), 10, 9);
        assert_eq!(merged.stars, MAX_STARS);
        assert!(merged.unlocked);
    }
}
