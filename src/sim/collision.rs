//! Ball collision against the world and against characters
//!
//! The rules are a fixed integer rule set, quirks included:
//! - the left wall reflects at the ball radius, the right wall at the court
//!   edge itself
//! - the rotation accumulator lets 50 through, which shows as rotation 5
//! - the net-top test here is bottom-inclusive; the predictor's is not

use glam::IVec2;

use super::state::{Ball, PlayerState, PunchEffect, UserInput};
use crate::consts::*;
use crate::rng::Rng;

/// Advance the ball one tick against bounds, net and ground.
///
/// Returns true when the ball touches the ground this tick. On that tick the
/// ball is snapped to the ground line and X is not committed.
pub fn advance_ball(ball: &mut Ball) -> bool {
    ball.previous_previous = ball.previous;
    ball.previous = ball.pos;

    let mut fine = ball.fine_rotation + ball.vel.x / 2;
    if fine < 0 {
        fine += 50;
    } else if fine > 50 {
        fine -= 50;
    }
    ball.fine_rotation = fine;
    ball.rotation = fine / 10;

    let future_x = ball.pos.x + ball.vel.x;
    if future_x < BALL_RADIUS || future_x > GROUND_WIDTH {
        ball.vel.x = -ball.vel.x;
    }

    if ball.pos.y + ball.vel.y < 0 {
        ball.vel.y = 1;
    }

    if (ball.pos.x - GROUND_HALF_WIDTH).abs() < NET_PILLAR_HALF_WIDTH
        && ball.pos.y > NET_PILLAR_TOP_TOP_Y
    {
        if ball.pos.y <= NET_PILLAR_TOP_BOTTOM_Y {
            if ball.vel.y > 0 {
                ball.vel.y = -ball.vel.y;
            }
        } else {
            ball.vel.x = push_away_from_net(ball.pos.x, ball.vel.x);
        }
    }

    let future_y = ball.pos.y + ball.vel.y;
    if future_y > BALL_TOUCHING_GROUND_Y {
        ball.sound.ground_touch = true;
        ball.vel.y = -ball.vel.y;
        ball.punch_effect.x = ball.pos.x;
        ball.pos.y = BALL_TOUCHING_GROUND_Y;
        ball.punch_effect.radius = BALL_RADIUS;
        ball.punch_effect.y = BALL_TOUCHING_GROUND_Y + BALL_RADIUS;
        return true;
    }

    ball.pos.y = future_y;
    ball.pos.x += ball.vel.x;
    ball.vel.y += 1;
    false
}

/// Horizontal velocity after hitting the side of the net pillar
#[inline]
pub(crate) fn push_away_from_net(x: i32, vel_x: i32) -> i32 {
    if x < GROUND_HALF_WIDTH {
        -vel_x.abs()
    } else {
        vel_x.abs()
    }
}

/// Square overlap between the ball center and a character hit box
#[inline]
pub fn ball_overlaps_player(ball_pos: IVec2, player_pos: IVec2) -> bool {
    (ball_pos.x - player_pos.x).abs() <= PLAYER_HALF_LENGTH
        && (ball_pos.y - player_pos.y).abs() <= PLAYER_HALF_LENGTH
}

/// Velocity a power hit gives the ball.
///
/// `incoming_vel_y` is the ball's vertical speed before contact; the base
/// reflection floors it at `MIN_BOUNCE_SPEED` first, so the branch predictor
/// and the real contact agree.
#[inline]
pub fn power_hit_velocity(ball_x: i32, incoming_vel_y: i32, x_direction: i32, y_direction: i32) -> IVec2 {
    let speed = (x_direction.abs() + 1) * POWER_HIT_STEP;
    let vel_x = if ball_x < GROUND_HALF_WIDTH { speed } else { -speed };
    let bounce = incoming_vel_y.abs().max(MIN_BOUNCE_SPEED);
    IVec2::new(vel_x, bounce * y_direction * 2)
}

/// Apply a character's impulse to the ball (rising edge of an overlap).
///
/// The zero-horizontal-speed tie break draws from the seeded stream since it
/// changes the recorded trajectory.
pub fn hit_ball(ball: &mut Ball, player_x: i32, input: UserInput, player_state: PlayerState, rng: &mut Rng) {
    let dx = ball.pos.x - player_x;
    if dx < 0 {
        ball.vel.x = -(dx.abs() / 3);
    } else if dx > 0 {
        ball.vel.x = dx.abs() / 3;
    }

    if ball.vel.x == 0 {
        ball.vel.x = rng.seeded() % 3 - 1;
    }

    let incoming_vel_y = ball.vel.y;
    ball.vel.y = -incoming_vel_y.abs().max(MIN_BOUNCE_SPEED);

    if player_state == PlayerState::JumpSmash {
        ball.vel = power_hit_velocity(ball.pos.x, incoming_vel_y, input.x_direction, input.y_direction);
        ball.punch_effect = PunchEffect {
            x: ball.pos.x,
            y: ball.pos.y,
            radius: BALL_RADIUS,
        };
        ball.sound.power_hit = true;
        ball.is_power_hit = true;
    } else {
        ball.is_power_hit = false;
    }
}
