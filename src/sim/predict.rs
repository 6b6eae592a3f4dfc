//! Trajectory prediction
//!
//! Forward simulation on a copy of the ball's position and velocity. The
//! real ball is never moved here; only its prediction fields are rebuilt.
//!
//! The copy follows the resolver's bound and net rules with one difference
//! kept on purpose: the net-top test is `y < 192` here and `y <= 192` in
//! the resolver. The computer player's tuning leans on that gap.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::collision::{power_hit_velocity, push_away_from_net};
use super::state::Ball;
use crate::consts::*;

/// Position and velocity of the ball at one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub pos: IVec2,
    pub vel: IVec2,
}

/// Hypothetical power-hit directions as `(|x_direction|, y_direction)`
pub const BRANCH_DIRECTIONS: [(i32, i32); BRANCH_COUNT] =
    [(1, -1), (1, 0), (1, 1), (0, -1), (0, 0), (0, 1)];
pub const BRANCH_COUNT: usize = 6;

/// One "what if I power hit it this way" forward simulation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branch {
    /// `(|x_direction|, y_direction)` of the hypothetical hit
    pub direction: (i32, i32),
    /// Starts at the contact point
    pub path: Vec<BallSnapshot>,
    pub landing_x: i32,
}

impl Branch {
    /// Ticks from contact until the ball crosses the ground line
    #[inline]
    pub fn ticks_to_land(&self) -> usize {
        self.path.len()
    }
}

/// All branches for one path entry
pub type BranchSet = [Branch; BRANCH_COUNT];

/// Step a copy of the ball until it would cross the ground line.
///
/// `path` is cleared and receives the start state followed by every
/// committed state. Returns the X at the crossing. The iteration cap turns a
/// non-converging bounce pattern into a best-effort answer.
pub fn trace(path: &mut Vec<BallSnapshot>, pos: IVec2, vel: IVec2) -> i32 {
    path.clear();
    let mut copy = BallSnapshot { pos, vel };
    path.push(copy);

    let mut loops = 0;
    loop {
        loops += 1;

        let future_x = copy.pos.x + copy.vel.x;
        if future_x < BALL_RADIUS || future_x > GROUND_WIDTH {
            copy.vel.x = -copy.vel.x;
        }
        if copy.pos.y + copy.vel.y < 0 {
            copy.vel.y = 1;
        }
        if (copy.pos.x - GROUND_HALF_WIDTH).abs() < NET_PILLAR_HALF_WIDTH
            && copy.pos.y > NET_PILLAR_TOP_TOP_Y
        {
            if copy.pos.y < NET_PILLAR_TOP_BOTTOM_Y {
                if copy.vel.y > 0 {
                    copy.vel.y = -copy.vel.y;
                }
            } else {
                copy.vel.x = push_away_from_net(copy.pos.x, copy.vel.x);
            }
        }

        copy.pos.y += copy.vel.y;
        if copy.pos.y > BALL_TOUCHING_GROUND_Y {
            break;
        }
        if loops >= PREDICTION_LOOP_LIMIT {
            log::trace!("prediction capped at {} steps, x={}", loops, copy.pos.x);
            break;
        }
        copy.pos.x += copy.vel.x;
        copy.vel.y += 1;
        path.push(copy);
    }

    copy.pos.x
}

/// Landing X only
pub fn landing_point(pos: IVec2, vel: IVec2) -> i32 {
    let mut path = Vec::new();
    trace(&mut path, pos, vel)
}

/// Rebuild the ball's path and expected landing point. With `extended`, also
/// rebuild the power-hit branches for the first `BRANCH_HORIZON` path entries.
pub fn update_prediction(ball: &mut Ball, extended: bool) {
    ball.expected_landing_x = trace(&mut ball.path, ball.pos, ball.vel);
    if extended {
        rebuild_branches(ball);
    } else {
        ball.branches.clear();
    }
}

fn rebuild_branches(ball: &mut Ball) {
    let horizon = ball.path.len().min(BRANCH_HORIZON);
    ball.branches.resize_with(horizon, Default::default);

    for (snap, set) in ball.path.iter().zip(ball.branches.iter_mut()) {
        for (branch, &(x_dir, y_dir)) in set.iter_mut().zip(BRANCH_DIRECTIONS.iter()) {
            let vel = power_hit_velocity(snap.pos.x, snap.vel.y, x_dir, y_dir);
            branch.direction = (x_dir, y_dir);
            branch.landing_x = trace(&mut branch.path, snap.pos, vel);
        }
    }
}
