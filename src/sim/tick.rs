//! Fixed tick simulation step
//!
//! One call runs one full update: paddle, ball kinematics, paddle collision,
//! brick collision, then the round state machine.

use rand::Rng;

use super::collision::{resolve_bricks, resolve_paddle};
use super::kinematics::{Field, WallContact, advance};
use super::state::{GameEvent, RoundPhase, RoundState};
use crate::consts::*;
use crate::settings::GameSettings;

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired paddle center x (latest known value from the input provider)
    pub paddle_x: Option<f32>,
    /// Launch the docked ball (edge-triggered)
    pub launch: bool,
    /// Idle/demo mode - autopilot plays the round
    pub idle_mode: bool,
}

/// Advance the round by one tick
pub fn tick(state: &mut RoundState, input: &TickInput, settings: &GameSettings) {
    if state.phase.is_terminal() {
        return;
    }

    // A level with nothing left to break is already won
    if state.all_bricks_destroyed() {
        state.win(settings);
        return;
    }

    let field = Field::from(settings);
    state.time_ticks += 1;

    let input = if input.idle_mode {
        autopilot(state, input)
    } else {
        input.clone()
    };

    // Paddle follows the desired position, always clamped to the field
    if let Some(target) = input.paddle_x {
        state.paddle.move_to(target, field.width);
    } else {
        state.paddle.clamp_to(field.width);
    }

    match state.phase {
        RoundPhase::Ready => {
            if state.respawn_ticks > 0 {
                state.respawn_ticks -= 1;
                if state.respawn_ticks == 0 {
                    state.reset_ball_and_paddle(field.width);
                    state.push_event(GameEvent::BallReset);
                }
                return;
            }

            let paddle = state.paddle;
            state.ball.dock(&paddle);

            if input.launch {
                launch(state);
            }
        }

        RoundPhase::Playing => {
            state.brick_cooldown = state.brick_cooldown.saturating_sub(1);

            let (ball, contact) = advance(&state.ball, field);
            state.ball = ball;
            match contact {
                WallContact::Lost => {
                    state.lose_ball();
                    return;
                }
                WallContact::Bounced => state.push_event(GameEvent::WallBounce),
                WallContact::None => {}
            }

            if let Some(bounce) = resolve_paddle(&state.ball, &state.paddle) {
                state.ball = bounce.ball;
                state.push_event(GameEvent::PaddleBounce {
                    hit_pos: bounce.hit_pos,
                });
            }

            if state.brick_cooldown == 0 {
                if let Some(hit) = resolve_bricks(&state.ball, &mut state.bricks, &settings.score) {
                    state.ball = hit.ball;
                    state.brick_cooldown = BRICK_COOLDOWN_TICKS;
                    if hit.destroyed {
                        state.score += hit.score_delta;
                        let position = state.bricks[hit.index].center();
                        state.push_event(GameEvent::BrickDestroyed {
                            index: hit.index,
                            kind: hit.kind,
                            points: hit.score_delta,
                            position,
                        });
                    } else {
                        state.push_event(GameEvent::BrickHit { index: hit.index });
                    }

                    if state.all_bricks_destroyed() {
                        state.win(settings);
                    }
                }
            }
        }

        RoundPhase::Won | RoundPhase::Failed => {}
    }
}

/// Launch the docked ball upward at a random angle within the launch cone
fn launch(state: &mut RoundState) {
    let angle = state.rng().random_range(-MAX_LAUNCH_ANGLE..=MAX_LAUNCH_ANGLE);
    state.ball.speed = state.ball.base_speed;
    state.ball.aim(angle);
    state.phase = RoundPhase::Playing;
    state.push_event(GameEvent::BallLaunched);
}

/// Autopilot: track the ball with a drifting offset and launch when docked
fn autopilot(state: &RoundState, input: &TickInput) -> TickInput {
    let mut input = input.clone();

    if state.phase == RoundPhase::Ready && state.respawn_ticks == 0 {
        input.launch = true;
    }

    // Offset varies over time so the ball doesn't settle into a vertical loop
    let time_factor = state.time_ticks as f32 * 0.01;
    let offset = (time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15) * state.paddle.width / 2.0;

    input.paddle_x = Some(if state.ball.is_moving() {
        state.ball.pos.x + offset
    } else {
        state.paddle.center_x()
    });
    input
}
