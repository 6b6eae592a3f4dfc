//! Reachability envelopes
//!
//! Where a character can put its hit box within a number of ticks, from the
//! closed-form jump arc and the walking speed. The envelopes are generous: a
//! `true` means "maybe", a `false` means "certainly not".

use crate::consts::*;
use crate::sim::predict::BallSnapshot;
use crate::sim::state::{Player, PlayerState};

/// Ticks from take-off to the top of the arc
pub const JUMP_APEX_TICKS: i32 = 16;
/// Last tick of a jump the character is still off the ground
pub const JUMP_AIR_TICKS: i32 = 32;
/// Ticks spent lying after a dive lands
const LYING_RECOVERY_TICKS: i32 = LYING_DOWN_TICKS + 2;
/// Airborne lookahead cap; a jump lands well within this
const MAX_AIR_STEPS: i32 = 64;

/// Height above the ground `t` ticks after a jump
#[inline]
pub fn jump_height(t: i32) -> i32 {
    let t = t.clamp(0, JUMP_AIR_TICKS + 1);
    -PLAYER_JUMP_VELOCITY * t - t * (t - 1) / 2
}

/// Follow an airborne character for `n` ticks. `None` once it has landed.
pub fn airborne_y(y: i32, vel_y: i32, n: i32) -> Option<i32> {
    let (mut y, mut vy) = (y, vel_y);
    for _ in 0..n {
        y += vy;
        if y > PLAYER_TOUCHING_GROUND_Y {
            return None;
        }
        if y < PLAYER_TOUCHING_GROUND_Y {
            vy += 1;
        }
    }
    Some(y)
}

/// Ticks until an airborne character lands
pub fn landing_ticks(y: i32, vel_y: i32) -> i32 {
    let (mut y, mut vy) = (y, vel_y);
    for n in 1..=MAX_AIR_STEPS {
        y += vy;
        if y > PLAYER_TOUCHING_GROUND_Y {
            return n;
        }
        if y < PLAYER_TOUCHING_GROUND_Y {
            vy += 1;
        }
    }
    MAX_AIR_STEPS
}

/// Whether `player` could overlap the ball at `ball` after `ticks` of its own moves
pub fn can_touch(player: &Player, ball: BallSnapshot, ticks: i32) -> bool {
    // (ticks it can walk, ticks it can jump from the ground, Y if still airborne)
    let (walk, grounded, air_y) = match player.state {
        PlayerState::Normal => (ticks, ticks, None),
        PlayerState::Jump | PlayerState::JumpSmash => {
            match airborne_y(player.pos.y, player.vel_y, ticks) {
                Some(y) => (ticks, 0, Some(y)),
                None => (ticks, ticks - landing_ticks(player.pos.y, player.vel_y), None),
            }
        }
        PlayerState::Dive => {
            let free = ticks - landing_ticks(player.pos.y, player.vel_y) - LYING_RECOVERY_TICKS;
            (free, free, None)
        }
        PlayerState::LyingDown => {
            let free = ticks - (player.lying_down_left + 2);
            (free, free, None)
        }
        PlayerState::Win | PlayerState::Lose => return false,
    };
    if walk < 0 || grounded < 0 {
        return false;
    }

    let (min_x, max_x) = player.side.x_range();
    if ball.pos.x < min_x - PLAYER_HALF_LENGTH || ball.pos.x > max_x + PLAYER_HALF_LENGTH {
        return false;
    }
    if (ball.pos.x - player.pos.x).abs() - PLAYER_HALF_LENGTH > PLAYER_WALK_SPEED * walk {
        return false;
    }

    match air_y {
        Some(y) => (ball.pos.y - y).abs() <= PLAYER_HALF_LENGTH,
        None => {
            let top = PLAYER_TOUCHING_GROUND_Y - jump_height(grounded.min(JUMP_APEX_TICKS));
            ball.pos.y >= top - PLAYER_HALF_LENGTH
                && ball.pos.y <= PLAYER_TOUCHING_GROUND_Y + PLAYER_HALF_LENGTH
        }
    }
}

/// Whether `opponent` could get a touch on a ball following `path`, where
/// `path[0]` is `start_ticks` ticks away
pub fn is_blockable(opponent: &Player, path: &[BallSnapshot], start_ticks: i32) -> bool {
    path.iter().enumerate().any(|(j, snap)| {
        opponent.side.owns_x(snap.pos.x) && can_touch(opponent, *snap, start_ticks + j as i32)
    })
}

/// When to leave the ground to meet the ball in the air
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTiming {
    /// Already airborne on a matching arc
    Airborne,
    /// Press jump after this many ticks
    In(i32),
}

/// Find a jump that puts the character level with `ball_y` on its `ticks`th
/// move, at least `min_air` ticks after take-off. `latest` prefers the last
/// possible take-off over the first.
pub fn jump_timing(player: &Player, ball_y: i32, ticks: i32, min_air: i32, latest: bool) -> Option<JumpTiming> {
    match player.state {
        PlayerState::Jump | PlayerState::JumpSmash => airborne_y(player.pos.y, player.vel_y, ticks)
            .filter(|y| (ball_y - y).abs() <= PLAYER_HALF_LENGTH)
            .map(|_| JumpTiming::Airborne),
        PlayerState::Normal if player.is_on_ground() => {
            let mut takeoffs = (0..ticks).filter(|s| {
                let air = ticks - s;
                (min_air..=JUMP_AIR_TICKS).contains(&air)
                    && (ball_y - (PLAYER_TOUCHING_GROUND_Y - jump_height(air))).abs() <= PLAYER_HALF_LENGTH
            });
            let takeoff = if latest { takeoffs.last() } else { takeoffs.next() };
            takeoff.map(JumpTiming::In)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::advance;
    use crate::sim::state::{Side, UserInput};
    use glam::IVec2;

    fn snap(x: i32, y: i32) -> BallSnapshot {
        BallSnapshot {
            pos: IVec2::new(x, y),
            vel: IVec2::ZERO,
        }
    }

    #[test]
    fn test_jump_height_matches_state_machine() {
        let mut p = Player::new(Side::Left, false);
        advance(&mut p, UserInput::new(0, -1, 0));
        for t in 1..=JUMP_AIR_TICKS {
            assert_eq!(p.pos.y, PLAYER_TOUCHING_GROUND_Y - jump_height(t), "tick {}", t);
            advance(&mut p, UserInput::NONE);
        }
        assert_eq!(jump_height(JUMP_APEX_TICKS), 136);
        assert_eq!(jump_height(JUMP_APEX_TICKS + 1), 136);
    }

    #[test]
    fn test_airborne_projection_matches_state_machine() {
        let mut p = Player::new(Side::Left, false);
        advance(&mut p, UserInput::new(0, -1, 0));
        for _ in 0..5 {
            advance(&mut p, UserInput::NONE);
        }
        let (y, vy) = (p.pos.y, p.vel_y);
        let land = landing_ticks(y, vy);
        for n in 1..land {
            advance(&mut p, UserInput::NONE);
            assert_eq!(airborne_y(y, vy, n), Some(p.pos.y));
        }
        advance(&mut p, UserInput::NONE);
        assert_eq!(p.state, PlayerState::Normal);
        assert_eq!(airborne_y(y, vy, land), None);
    }

    #[test]
    fn test_standing_player_reach() {
        let p = Player::new(Side::Left, true);
        // Right in front, at head height
        assert!(can_touch(&p, snap(50, 220), 1));
        // Too high for one tick, fine once a jump can peak
        assert!(!can_touch(&p, snap(50, 100), 1));
        assert!(can_touch(&p, snap(50, 100), 20));
        // Too far to walk in time
        assert!(!can_touch(&p, snap(180, 220), 2));
        assert!(can_touch(&p, snap(180, 220), 20));
        // Out of the side's range
        assert!(!can_touch(&p, snap(300, 220), 100));
    }

    #[test]
    fn test_lying_player_cannot_reach_until_recovered() {
        let mut p = Player::new(Side::Right, true);
        p.state = PlayerState::LyingDown;
        p.lying_down_left = LYING_DOWN_TICKS;
        let ball = snap(p.pos.x, 230);
        assert!(!can_touch(&p, ball, 2));
        assert!(can_touch(&p, ball, 6));
    }

    #[test]
    fn test_blockable_only_on_opponent_side() {
        let opp = Player::new(Side::Right, true);
        let near = [snap(200, 230), snap(396, 230)];
        assert!(is_blockable(&opp, &near, 1));
        let far = [snap(200, 230), snap(240, 260)];
        assert!(!is_blockable(&opp, &far, 1));
    }

    #[test]
    fn test_jump_timing_earliest_and_latest() {
        let p = Player::new(Side::Left, true);
        let early = jump_timing(&p, 140, 20, 3, false);
        let late = jump_timing(&p, 140, 20, 3, true);
        let (Some(JumpTiming::In(a)), Some(JumpTiming::In(b))) = (early, late) else {
            panic!("no jump found: {:?} {:?}", early, late);
        };
        assert!(a < b);
        for s in [a, b] {
            let y = PLAYER_TOUCHING_GROUND_Y - jump_height(20 - s);
            assert!((140 - y).abs() <= PLAYER_HALF_LENGTH);
        }
        // Unreachable height
        assert_eq!(jump_timing(&p, 10, 20, 3, false), None);
    }
}
