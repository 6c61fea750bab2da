//! Collision detection and response for the paddle and bricks
//!
//! Both resolvers are pure over the ball: they return the reflected ball (or
//! `None` for no contact) and leave the caller to commit it.

use glam::Vec2;

use super::state::{Ball, Brick, BrickKind, Paddle};
use crate::closest_point_on_rect;
use crate::consts::*;
use crate::scoring;
use crate::settings::ScoreSettings;

/// Result of a paddle bounce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddleBounce {
    pub ball: Ball,
    /// Where the ball struck, -1 (left edge) to 1 (right edge)
    pub hit_pos: f32,
}

/// How a ball met a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// One axis dominant; that axis reflects
    Edge,
    /// Both normalized offsets beyond the corner threshold; both axes reflect
    Corner,
}

/// Result of a brick collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrickCollision {
    pub ball: Ball,
    pub index: usize,
    pub impact: Impact,
    pub destroyed: bool,
    pub kind: BrickKind,
    /// Points awarded (zero unless the brick was destroyed)
    pub score_delta: u64,
}

/// Bounce the ball off the paddle if it is moving down into it
///
/// The bounce angle depends only on where the ball lands: the center sends it
/// straight up, the edges send it off at up to 60 degrees. Speed is preserved.
pub fn resolve_paddle(ball: &Ball, paddle: &Paddle) -> Option<PaddleBounce> {
    if ball.vel.y <= 0.0 {
        return None;
    }

    let overlaps_y =
        ball.pos.y + ball.radius >= paddle.y && ball.pos.y - ball.radius <= paddle.y + paddle.height;
    let within_x = ball.pos.x >= paddle.x && ball.pos.x <= paddle.x + paddle.width;
    if !(overlaps_y && within_x) {
        return None;
    }

    let half_width = paddle.width / 2.0;
    let hit_pos = if half_width > 0.0 {
        ((ball.pos.x - paddle.center_x()) / half_width).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let mut next = *ball;
    next.aim(hit_pos * PADDLE_MAX_BOUNCE);
    next.pos.y = paddle.y - next.radius;

    Some(PaddleBounce {
        ball: next,
        hit_pos,
    })
}

/// True if the ball's circle overlaps the brick's rectangle
pub fn ball_overlaps_brick(ball: &Ball, brick: &Brick) -> bool {
    let closest = closest_point_on_rect(ball.pos, brick.pos, brick.size);
    ball.pos.distance(closest) < ball.radius
}

/// Classify an impact from the ball position relative to the brick
///
/// Returns the impact and the normalized offsets used for the decision.
pub fn classify_impact(ball_pos: Vec2, brick: &Brick) -> (Impact, Vec2) {
    let half = brick.size / 2.0;
    let offset = (ball_pos - brick.center()) / half;
    let impact = if offset.x.abs() > CORNER_THRESHOLD && offset.y.abs() > CORNER_THRESHOLD {
        Impact::Corner
    } else {
        Impact::Edge
    };
    (impact, offset)
}

/// Resolve the first brick (in iteration order) the ball overlaps
///
/// At most one brick is processed per call. The hit brick's counters are
/// updated in place; the reflected ball is returned for the caller to commit.
pub fn resolve_bricks(ball: &Ball, bricks: &mut [Brick], score: &ScoreSettings) -> Option<BrickCollision> {
    let index = bricks
        .iter()
        .position(|brick| !brick.destroyed && ball_overlaps_brick(ball, brick))?;
    let brick = &mut bricks[index];

    let (impact, offset) = classify_impact(ball.pos, brick);
    let mut next = *ball;

    // Send each reflected axis away from the brick center
    let away = |velocity: f32, offset: f32| -> f32 {
        if offset == 0.0 {
            -velocity
        } else {
            velocity.abs() * offset.signum()
        }
    };

    let speedup = match impact {
        Impact::Corner => {
            next.vel.x = away(next.vel.x, offset.x);
            next.vel.y = away(next.vel.y, offset.y);
            CORNER_SPEEDUP
        }
        Impact::Edge => {
            if offset.x.abs() > offset.y.abs() {
                next.vel.x = away(next.vel.x, offset.x);
            } else {
                next.vel.y = away(next.vel.y, offset.y);
            }
            EDGE_SPEEDUP
        }
    };
    next.set_speed(next.speed * speedup);

    let destroyed = brick.register_hit();
    let score_delta = if destroyed {
        scoring::brick_points(brick.kind, score)
    } else {
        0
    };

    Some(BrickCollision {
        ball: next,
        index,
        impact,
        destroyed,
        kind: brick.kind,
        score_delta,
    })
}
