//! Ball integration and wall response
//!
//! Velocity is a per-tick displacement: one call advances one tick.

use serde::{Deserialize, Serialize};

use super::state::Ball;
use crate::settings::GameSettings;

/// Play field bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl From<&GameSettings> for Field {
    fn from(settings: &GameSettings) -> Self {
        Self {
            width: settings.canvas_width,
            height: settings.canvas_height,
        }
    }
}

/// What happened to the ball during one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallContact {
    None,
    /// Reflected off the left, right or top wall
    Bounced,
    /// Crossed the bottom edge; not resolved here
    Lost,
}

/// Advance the ball one tick and resolve wall collisions
pub fn advance(ball: &Ball, field: Field) -> (Ball, WallContact) {
    let mut next = *ball;
    next.pos += next.vel;

    if next.pos.y >= field.height {
        return (next, WallContact::Lost);
    }

    let mut bounced = false;

    if next.pos.x <= next.radius {
        next.pos.x = next.radius;
        next.vel.x = next.vel.x.abs();
        bounced = true;
    } else if next.pos.x >= field.width - next.radius {
        next.pos.x = field.width - next.radius;
        next.vel.x = -next.vel.x.abs();
        bounced = true;
    }

    if next.pos.y <= next.radius {
        next.pos.y = next.radius;
        next.vel.y = next.vel.y.abs();
        bounced = true;
    }

    let contact = if bounced {
        WallContact::Bounced
    } else {
        WallContact::None
    };
    (next, contact)
}
