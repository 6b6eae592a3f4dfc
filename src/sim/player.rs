//! Character state machine
//!
//! One call advances one player one tick with an already resolved input.

use super::state::{Player, PlayerState, Side, UserInput};
use crate::consts::*;

/// Advance `player` one tick.
pub fn advance(player: &mut Player, input: UserInput) {
    if player.state == PlayerState::LyingDown {
        player.lying_down_left -= 1;
        if player.lying_down_left < -1 {
            player.state = PlayerState::Normal;
        }
        return;
    }

    let vel_x = match player.state {
        PlayerState::Normal | PlayerState::Jump | PlayerState::JumpSmash => {
            input.x_direction * PLAYER_WALK_SPEED
        }
        PlayerState::Dive => player.diving_direction * PLAYER_DIVE_SPEED,
        _ => 0,
    };
    player.pos.x = clamp_x(player.side, player.pos.x + vel_x);

    if player.state.is_controllable() && input.y_direction == -1 && player.is_on_ground() {
        player.vel_y = PLAYER_JUMP_VELOCITY;
        player.state = PlayerState::Jump;
        player.frame = 0;
        player.sound.jump_or_dive = true;
    }

    let future_y = player.pos.y + player.vel_y;
    player.pos.y = future_y;
    if future_y < PLAYER_TOUCHING_GROUND_Y {
        player.vel_y += 1;
    } else if future_y > PLAYER_TOUCHING_GROUND_Y {
        player.vel_y = 0;
        player.pos.y = PLAYER_TOUCHING_GROUND_Y;
        player.frame = 0;
        if player.state == PlayerState::Dive {
            player.state = PlayerState::LyingDown;
            player.lying_down_left = LYING_DOWN_TICKS;
        } else {
            player.state = PlayerState::Normal;
        }
    }

    if input.power_hit == 1 {
        if player.state == PlayerState::Jump {
            player.delay_before_next_frame = 5;
            player.frame = 0;
            player.state = PlayerState::JumpSmash;
            player.sound.smash = true;
        } else if player.state == PlayerState::Normal && input.x_direction != 0 {
            player.state = PlayerState::Dive;
            player.frame = 0;
            player.diving_direction = input.x_direction;
            player.vel_y = PLAYER_DIVE_VELOCITY;
            player.sound.jump_or_dive = true;
        }
    }

    animate(player);

    if player.game_ended {
        if player.state == PlayerState::Normal {
            if player.is_winner {
                player.state = PlayerState::Win;
                player.sound.win = true;
            } else {
                player.state = PlayerState::Lose;
            }
            player.delay_before_next_frame = 0;
            player.frame = 0;
        }
        advance_game_end_frame(player);
    }
}

/// Clamp a player center into its side's reachable range
#[inline]
pub fn clamp_x(side: Side, x: i32) -> i32 {
    let (min, max) = side.x_range();
    x.clamp(min, max)
}

fn animate(player: &mut Player) {
    match player.state {
        PlayerState::Jump => {
            player.frame = (player.frame + 1) % 3;
        }
        PlayerState::JumpSmash => {
            if player.delay_before_next_frame < 1 {
                player.frame += 1;
                if player.frame > 4 {
                    player.frame = 0;
                    player.state = PlayerState::Jump;
                }
            } else {
                player.delay_before_next_frame -= 1;
            }
        }
        PlayerState::Normal => {
            player.delay_before_next_frame += 1;
            if player.delay_before_next_frame > 3 {
                player.delay_before_next_frame = 0;
                let future_frame = player.frame + player.arm_swing_direction;
                if !(0..=4).contains(&future_frame) {
                    player.arm_swing_direction = -player.arm_swing_direction;
                }
                player.frame += player.arm_swing_direction;
            }
        }
        _ => {}
    }
}

/// Win/Lose animation runs at a fifth of the tick rate and holds on frame 4
fn advance_game_end_frame(player: &mut Player) {
    if player.frame < 4 {
        player.delay_before_next_frame += 1;
        if player.delay_before_next_frame > 4 {
            player.delay_before_next_frame = 0;
            player.frame += 1;
        }
    }
}
