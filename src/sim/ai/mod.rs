//! Computer player
//!
//! Runs once per tick for a computer-controlled side, before that side moves,
//! and writes its input. Momentary choices draw from the live stream: they
//! reach a replay only through the resolved input.

pub mod plan;
pub mod reach;

pub use plan::{AiPlanner, DirectionCode, HitVariant, Plan};

use glam::IVec2;
use reach::{JumpTiming, can_touch, is_blockable, jump_timing};

use super::player::clamp_x;
use super::predict::{BallSnapshot, Branch, landing_point};
use super::serve::ServeAction;
use super::state::{Ball, Player, PlayerState, Side, UserInput};
use crate::consts::*;
use crate::rng::Rng;
use crate::settings::{AiConfig, DefensePolicy};

/// No walking inside this distance of the target
const MOVE_DEADBAND: i32 = 3;
/// Spikes press the hit key this many ticks before contact
pub const SMASH_LEAD: i32 = 2;
/// Distance to stand behind the ball at contact, per touch kind
const SPIKE_OFFSET: i32 = 12;
const SET_OFFSET: i32 = 4;
/// Receive distances to try, nearest first
const RECEIVE_OFFSETS: [i32; 4] = [12, 16, 20, 24];
/// Ticks a set keeps the follow-up spike armed
const SECOND_ATTACK_WINDOW: i32 = 40;
/// Back-line waiting spot, measured from the wall
const FAR_LINE_X: i32 = 54;
/// Ball height below which a far ball is worth a dive
const DIVE_BALL_Y: i32 = 174;
/// Half-width around the net where the safety check applies
const SAFETY_NET_DISTANCE: i32 = 64;

/// Who touches the ball next, and at which path entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toucher {
    Me(usize),
    Opponent(usize),
    Nobody,
}

/// Decide this tick's input for `me`.
pub fn decide(
    me: &mut Player,
    ball: &Ball,
    opponent: &Player,
    config: &AiConfig,
    rng: &mut Rng,
    input: &mut UserInput,
) {
    if me.serve.is_running() {
        match me.serve.next_action() {
            ServeAction::Done => {
                log::debug!("{:?} serve script done, resuming", me.side);
                me.serve.stop();
            }
            action => {
                *input = action.to_input(me.side);
                return;
            }
        }
    }

    *input = UserInput::NONE;

    if me.ai.observed_landing != Some(ball.expected_landing_x) {
        me.ai.invalidate(ball.expected_landing_x);
    }

    if me.ai.goodtime == Plan::NoPlan {
        match classify(me, ball, opponent) {
            Toucher::Me(k) => match plan_touch(me, ball, opponent, config, rng, k) {
                Some(plan) => me.ai.goodtime = plan,
                None => walk_toward(me.pos.x, clamp_x(me.side, ball.expected_landing_x), input),
            },
            Toucher::Opponent(_) => {
                let x = defense_target(me, ball, opponent, config.defense, rng);
                walk_toward(me.pos.x, x, input);
            }
            Toucher::Nobody => cover_landing(me, ball, input),
        }
    }

    if let Plan::PendingHit {
        ticks_left,
        target_x,
        direction,
        variant,
        jump_in,
    } = me.ai.goodtime
    {
        walk_toward(me.pos.x, target_x, input);
        if jump_in == Some(0) {
            input.y_direction = -1;
        }
        let smash = variant.is_power_hit() && me.state == PlayerState::Jump;
        if smash && ticks_left <= SMASH_LEAD {
            input.power_hit = 1;
        }
        if ticks_left == 0 {
            let (x, y) = direction.to_input(me.side);
            input.x_direction = x;
            input.y_direction = y;
        }
    }

    if config.safety_check {
        safety_check(me, ball, input);
    }

    me.ai.tick();
}

/// Scan the forward path for the first entry either side can reach
pub fn classify(me: &Player, ball: &Ball, opponent: &Player) -> Toucher {
    for (k, snap) in ball.path.iter().enumerate() {
        let ticks = k as i32 + 1;
        if me.side.owns_x(snap.pos.x) && can_touch(me, *snap, ticks) {
            return Toucher::Me(k);
        }
        if opponent.side.owns_x(snap.pos.x) && can_touch(opponent, *snap, ticks) {
            return Toucher::Opponent(k);
        }
    }
    Toucher::Nobody
}

fn plan_touch(
    me: &mut Player,
    ball: &Ball,
    opponent: &Player,
    config: &AiConfig,
    rng: &mut Rng,
    first: usize,
) -> Option<Plan> {
    search_spike(me, ball, opponent, config, rng).or_else(|| plan_soft_touch(me, ball, config, rng, first))
}

/// Earliest reachable contact with a power hit landing on the opponent's
/// court. With branch search the hit must also be out of the opponent's
/// reach, and the fewest ticks to land wins.
fn search_spike(me: &Player, ball: &Ball, opponent: &Player, config: &AiConfig, rng: &mut Rng) -> Option<Plan> {
    let variant = if me.ai.combo_armed() {
        HitVariant::SecondJump
    } else if config.juke && rng.live() % 3 == 0 {
        HitVariant::Juke
    } else if config.fancy && rng.live() % 2 == 0 {
        HitVariant::Fancy
    } else {
        HitVariant::Plain
    };
    let toward = me.side.toward_net();

    for (k, (snap, set)) in ball.path.iter().zip(ball.branches.iter()).enumerate() {
        if !me.side.owns_x(snap.pos.x) {
            continue;
        }
        let ticks = k as i32 + 1;
        let Some(target_x) = contact_x(me, snap.pos.x - toward * SPIKE_OFFSET, snap.pos.x, ticks) else {
            continue;
        };
        let latest = variant == HitVariant::Fancy;
        let Some(timing) = jump_timing(me, snap.pos.y, ticks, SMASH_LEAD + 1, latest) else {
            continue;
        };

        let landing: Vec<&Branch> = set
            .iter()
            .filter(|b| me.side.opposite().loses_on(b.landing_x))
            .collect();
        let candidates: Vec<&Branch> = if config.branch_search {
            let legal: Vec<&Branch> = landing
                .into_iter()
                .filter(|b| !is_blockable(opponent, &b.path, ticks))
                .collect();
            let Some(fastest) = legal.iter().map(|b| b.ticks_to_land()).min() else {
                continue;
            };
            legal.into_iter().filter(|b| b.ticks_to_land() == fastest).collect()
        } else {
            landing
        };
        let pick = match candidates.len() {
            0 => continue,
            1 => candidates[0],
            n => candidates[rng.live() as usize % n],
        };

        let (x_abs, y) = pick.direction;
        let mut direction = DirectionCode::from_pair(x_abs, y);
        if variant == HitVariant::Juke {
            direction = direction.flipped();
        }
        let jump_in = match timing {
            JumpTiming::Airborne => None,
            JumpTiming::In(s) => Some(s),
        };
        log::debug!(
            "{:?} plans {:?} in {} ticks at x={} code={} landing={}",
            me.side,
            variant,
            k,
            target_x,
            direction.value(),
            pick.landing_x
        );
        return Some(Plan::PendingHit {
            ticks_left: k as i32,
            target_x,
            direction,
            variant,
            jump_in,
        });
    }
    None
}

/// Set or receive at the first path entry that can be met
fn plan_soft_touch(me: &mut Player, ball: &Ball, config: &AiConfig, rng: &mut Rng, first: usize) -> Option<Plan> {
    let set = config.second_attack && !me.ai.combo_armed();
    let variant = if set { HitVariant::Set } else { HitVariant::Receive };
    let toward = me.side.toward_net();

    for (k, snap) in ball.path.iter().enumerate().skip(first) {
        if !me.side.owns_x(snap.pos.x) {
            continue;
        }
        let ticks = k as i32 + 1;
        let target_x = if set {
            contact_x(me, snap.pos.x - toward * SET_OFFSET, snap.pos.x, ticks)
        } else {
            receive_x(me, *snap, ticks, rng)
        };
        let Some(target_x) = target_x else {
            continue;
        };
        let standing = me.state == PlayerState::Normal
            && snap.pos.y >= PLAYER_TOUCHING_GROUND_Y - PLAYER_HALF_LENGTH;
        let jump_in = if standing {
            None
        } else {
            match jump_timing(me, snap.pos.y, ticks, 1, false) {
                Some(JumpTiming::Airborne) => None,
                Some(JumpTiming::In(s)) => Some(s),
                None => continue,
            }
        };

        if set {
            me.ai.second_attack = Some(ticks + SECOND_ATTACK_WINDOW);
        }
        log::debug!("{:?} plans {:?} in {} ticks at x={}", me.side, variant, k, target_x);
        return Some(Plan::PendingHit {
            ticks_left: k as i32,
            target_x,
            direction: DirectionCode::from_pair(0, 0),
            variant,
            jump_in,
        });
    }
    None
}

/// Standing spot for a receive that sends the ball over the net even when
/// the player stops a deadband short or long. Falls back to the farthest
/// reachable spot when no distance clears the net.
fn receive_x(me: &Player, snap: BallSnapshot, ticks: i32, rng: &mut Rng) -> Option<i32> {
    let toward = me.side.toward_net();
    let rebound_y = -snap.vel.y.abs().max(MIN_BOUNCE_SPEED);
    let mut fallback = None;
    let mut over = Vec::new();

    for offset in RECEIVE_OFFSETS {
        let Some(x) = contact_x(me, snap.pos.x - toward * offset, snap.pos.x, ticks) else {
            continue;
        };
        fallback = Some(x);
        let dx = snap.pos.x - x;
        let crosses = [dx - MOVE_DEADBAND, dx, dx + MOVE_DEADBAND].iter().all(|&d| {
            let landing = landing_point(snap.pos, IVec2::new(d / 3, rebound_y));
            me.side.opposite().loses_on(landing)
        });
        if crosses {
            over.push(x);
        }
    }

    match over.len() {
        0 => fallback,
        1 => Some(over[0]),
        n => Some(over[rng.live() as usize % n]),
    }
}

/// Clamped standing spot for a contact with a ball at `ball_x`, if it can be
/// reached in `ticks` and still overlaps the ball
fn contact_x(me: &Player, wanted: i32, ball_x: i32, ticks: i32) -> Option<i32> {
    let x = clamp_x(me.side, wanted);
    let overlaps = (ball_x - x).abs() <= PLAYER_HALF_LENGTH - PLAYER_WALK_SPEED;
    let reachable = (x - me.pos.x).abs() <= PLAYER_WALK_SPEED * ticks + MOVE_DEADBAND;
    (overlaps && reachable).then_some(x)
}

fn defense_target(me: &mut Player, ball: &Ball, opponent: &Player, policy: DefensePolicy, rng: &mut Rng) -> i32 {
    let mirror = GROUND_WIDTH - opponent.pos.x;
    let x = match policy {
        DefensePolicy::Mirror => mirror,
        DefensePolicy::FarLine => match me.side {
            Side::Left => FAR_LINE_X,
            Side::Right => GROUND_WIDTH - FAR_LINE_X,
        },
        DefensePolicy::Random => {
            let boldness = me.boldness;
            *me.ai.defense_x.get_or_insert_with(|| {
                if rng.live() % (boldness + 2) == 0 {
                    ball.expected_landing_x
                } else {
                    mirror
                }
            })
        }
    };
    clamp_x(me.side, x)
}

/// Nobody reaches the ball: chase it if it lands here, otherwise wait
fn cover_landing(me: &Player, ball: &Ball, input: &mut UserInput) {
    if !me.side.loses_on(ball.expected_landing_x) {
        let center = match me.side {
            Side::Left => GROUND_HALF_WIDTH / 2,
            Side::Right => GROUND_WIDTH - GROUND_HALF_WIDTH / 2,
        };
        walk_toward(me.pos.x, center, input);
        return;
    }

    walk_toward(me.pos.x, clamp_x(me.side, ball.expected_landing_x), input);
    let far = (ball.pos.x - me.pos.x).abs() > PLAYER_LENGTH + me.boldness * 5;
    if far && ball.pos.y > DIVE_BALL_Y && me.state == PlayerState::Normal && input.x_direction != 0 {
        input.power_hit = 1;
    }
}

/// A power hit while a max-speed ball races at the own back line from the
/// net would only help it along; step away instead.
fn safety_check(me: &Player, ball: &Ball, input: &mut UserInput) {
    if input.power_hit == 0 {
        return;
    }
    let toward = me.side.toward_net();
    let racing_home = ball.vel.x * toward < 0 && ball.vel.x.abs() >= MAX_POWER_HIT_SPEED;
    if racing_home && (me.pos.x - GROUND_HALF_WIDTH).abs() < SAFETY_NET_DISTANCE {
        log::debug!("{:?} safety check suppressed a power hit", me.side);
        input.power_hit = 0;
        input.x_direction = -toward;
    }
}

#[inline]
fn walk_toward(x: i32, target: i32, input: &mut UserInput) {
    input.x_direction = if target > x + MOVE_DEADBAND {
        1
    } else if target < x - MOVE_DEADBAND {
        -1
    } else {
        0
    };
}
